//! Token issuance and validation. Access and refresh tokens share one HS256
//! signing secret but carry distinct types; every validation site checks the
//! type so one can never stand in for the other.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::error::{AppError, Result};

const ISSUER: &str = "blog-api";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub iss: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    validation: Validation,
}

impl JwtManager {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // No clock leeway: a token is expired the moment `exp` passes.
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.set_issuer(&[ISSUER]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            access_ttl: Duration::seconds(config.access_ttl_secs),
            refresh_ttl: Duration::seconds(config.refresh_ttl_secs),
            validation,
        }
    }

    /// Issue a single signed token of the given type.
    pub fn issue(&self, user_id: i64, username: &str, token_type: TokenType) -> Result<String> {
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        let now = Utc::now();

        let claims = Claims {
            user_id,
            username: username.to_string(),
            token_type,
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: ISSUER.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Token generation failed: {}", e);
            AppError::Internal(anyhow::anyhow!("token generation failed"))
        })
    }

    /// Issue an access/refresh pair. If either token cannot be signed the
    /// whole call fails and nothing is returned.
    pub fn issue_pair(&self, user_id: i64, username: &str) -> Result<TokenPair> {
        let access_token = self.issue(user_id, username, TokenType::Access)?;
        let refresh_token = self.issue(user_id, username, TokenType::Refresh)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.access_ttl.num_seconds(),
        })
    }

    /// Decode and verify a token. Only HS256 signatures from our secret with
    /// our issuer are accepted; an expired-but-otherwise-valid token is
    /// reported distinctly from a malformed one.
    pub fn validate(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::TokenInvalid,
            })
    }

    pub fn validate_access(&self, token: &str) -> Result<Claims> {
        let claims = self.validate(token)?;
        match claims.token_type {
            TokenType::Access => Ok(claims),
            TokenType::Refresh => Err(AppError::TokenInvalid),
        }
    }

    pub fn validate_refresh(&self, token: &str) -> Result<Claims> {
        let claims = self.validate(token)?;
        match claims.token_type {
            TokenType::Refresh => Ok(claims),
            TokenType::Access => Err(AppError::TokenInvalid),
        }
    }
}
