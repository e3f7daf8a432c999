use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::{UpdateProfileRequest, User};

/// User persistence boundary consumed by the auth service. The service only
/// ever sees this trait, so tests can swap in an in-memory store.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Returns false when no row matched the id.
    async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<bool>;

    /// Merge-patch: only non-empty fields overwrite the stored values.
    /// Returns false when no row matched the id.
    async fn update_profile_fields(&self, id: i64, fields: &UpdateProfileRequest) -> Result<bool>;
}

#[derive(Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, display_name, avatar, bio, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, display_name, avatar, bio, created_at, updated_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(password_hash)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_profile_fields(&self, id: i64, fields: &UpdateProfileRequest) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET display_name = COALESCE(NULLIF(?, ''), display_name),
                email        = COALESCE(NULLIF(?, ''), email),
                avatar       = COALESCE(NULLIF(?, ''), avatar),
                bio          = COALESCE(NULLIF(?, ''), bio),
                updated_at   = ?
            WHERE id = ?
            "#,
        )
        .bind(&fields.display_name)
        .bind(&fields.email)
        .bind(&fields.avatar)
        .bind(&fields.bio)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
