//! Database seed script for creating the initial admin user
//! Run with: cargo run --bin seed

use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;

use blog_api::security::password;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE__URL")
        .unwrap_or_else(|_| "sqlite://blog.db?mode=rwc".to_string());

    println!("Connecting to database...");

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    // Default admin credentials
    let username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());
    let admin_password =
        std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "change-me-now".to_string());

    println!("Hashing password...");
    let password_hash = password::hash_password(&admin_password)?;

    // Check if the admin exists
    let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE username = ?")
        .bind(&username)
        .fetch_optional(&pool)
        .await?;

    match existing {
        Some((id,)) => {
            println!("Updating existing admin password...");
            sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
                .bind(&password_hash)
                .bind(Utc::now())
                .bind(id)
                .execute(&pool)
                .await?;
            println!("Admin password updated successfully!");
        }
        None => {
            println!("Creating admin user...");
            let now = Utc::now();
            sqlx::query(
                r#"
                INSERT INTO users (username, email, password_hash, display_name, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&username)
            .bind(&email)
            .bind(&password_hash)
            .bind(&username)
            .bind(now)
            .bind(now)
            .execute(&pool)
            .await?;
            println!("Admin user created successfully!");
        }
    }

    Ok(())
}
