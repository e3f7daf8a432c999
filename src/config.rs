use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Token signing secret. Required; there is no safe default.
    pub secret: String,
    #[serde(default = "default_access_ttl_secs")]
    pub access_ttl_secs: i64,
    #[serde(default = "default_refresh_ttl_secs")]
    pub refresh_ttl_secs: i64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_database_url() -> String {
    "sqlite://blog.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_access_ttl_secs() -> i64 {
    900 // 15 minutes
}

fn default_refresh_ttl_secs() -> i64 {
    604_800 // 168 hours
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Environment::default().separator("__"))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.url", "sqlite://blog.db?mode=rwc")?
            .set_default("database.max_connections", 5)?
            .set_default("jwt.access_ttl_secs", 900)?
            .set_default("jwt.refresh_ttl_secs", 604_800)?
            .build()?;

        let cfg: Config = config.try_deserialize()?;

        if cfg.jwt.secret.trim().is_empty() {
            anyhow::bail!("JWT__SECRET must be set to a non-empty value");
        }

        Ok(cfg)
    }
}
