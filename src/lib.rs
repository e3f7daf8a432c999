pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod response;
pub mod security;
pub mod services;

pub use error::{AppError, Result};

use std::sync::Arc;

use security::jwt::JwtManager;
use services::AuthService;

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub tokens: Arc<JwtManager>,
}
