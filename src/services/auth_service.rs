use std::sync::Arc;

use serde::Serialize;

use crate::db::UserStore;
use crate::error::{AppError, Result};
use crate::models::{UpdateProfileRequest, UserResponse};
use crate::security::jwt::{JwtManager, TokenPair};
use crate::security::password;

#[derive(Debug, Serialize)]
pub struct LoginResult {
    pub user: UserResponse,
    pub tokens: TokenPair,
}

/// Authentication business logic over an injected user store.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    tokens: Arc<JwtManager>,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, tokens: Arc<JwtManager>) -> Self {
        Self { store, tokens }
    }

    /// Verify credentials and issue a token pair. An unknown username and a
    /// wrong password are indistinguishable to the caller.
    pub async fn login(&self, username: &str, secret: &str) -> Result<LoginResult> {
        let user = self
            .store
            .get_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !password::verify_password(secret, &user.password_hash) {
            return Err(AppError::InvalidCredentials);
        }

        let tokens = self.tokens.issue_pair(user.id, &user.username)?;

        tracing::info!("User logged in: {}", user.username);

        Ok(LoginResult {
            user: UserResponse::from(&user),
            tokens,
        })
    }

    /// Exchange a refresh token for a fresh pair. The subject must still
    /// exist; a deleted user cannot mint new tokens from an old refresh
    /// token. Both tokens rotate.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let claims = self.tokens.validate_refresh(refresh_token)?;

        let user = self
            .store
            .get_by_id(claims.user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        self.tokens.issue_pair(user.id, &user.username)
    }

    pub async fn current_user(&self, user_id: i64) -> Result<UserResponse> {
        let user = self
            .store
            .get_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        Ok(UserResponse::from(&user))
    }

    /// Verify the old password against current state, then persist the new
    /// hash. The user is re-checked at the write in case it vanished since
    /// authentication.
    pub async fn change_password(
        &self,
        user_id: i64,
        old_secret: &str,
        new_secret: &str,
    ) -> Result<()> {
        let user = self
            .store
            .get_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if !password::verify_password(old_secret, &user.password_hash) {
            return Err(AppError::InvalidOldPassword);
        }

        let new_hash = password::hash_password(new_secret)?;

        if !self.store.update_password_hash(user_id, &new_hash).await? {
            return Err(AppError::UserNotFound);
        }

        tracing::info!("Password changed for user: {}", user.username);
        Ok(())
    }

    /// Merge-patch the profile, then return the canonical re-read state.
    pub async fn update_profile(
        &self,
        user_id: i64,
        update: &UpdateProfileRequest,
    ) -> Result<UserResponse> {
        self.store
            .get_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if !self.store.update_profile_fields(user_id, update).await? {
            return Err(AppError::UserNotFound);
        }

        let user = self
            .store
            .get_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        Ok(UserResponse::from(&user))
    }

    /// Stateless: nothing to invalidate server-side, clients discard their
    /// tokens.
    pub fn logout(&self, user_id: i64) {
        tracing::info!("User logged out: {}", user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use crate::db::mock::{test_user, MockUserStore};
    use crate::security::jwt::TokenType;

    const TEST_COST: u32 = 4;

    fn jwt_manager() -> Arc<JwtManager> {
        Arc::new(JwtManager::new(&JwtConfig {
            secret: "service-test-secret-0123456789abcdef012345".to_string(),
            access_ttl_secs: 900,
            refresh_ttl_secs: 604_800,
        }))
    }

    fn service_with_alice() -> (AuthService, Arc<MockUserStore>) {
        let store = Arc::new(MockUserStore::new());
        let hash = password::hash_password_with_cost("correct-password", TEST_COST).unwrap();
        store.insert(test_user(1, "alice", &hash));

        let service = AuthService::new(store.clone(), jwt_manager());
        (service, store)
    }

    #[tokio::test]
    async fn test_login_returns_tokens_and_public_view() {
        let (service, _) = service_with_alice();

        let result = service.login("alice", "correct-password").await.unwrap();

        assert_eq!(result.user.id, 1);
        assert_eq!(result.user.username, "alice");
        assert!(!result.tokens.access_token.is_empty());
        assert!(!result.tokens.refresh_token.is_empty());
        assert_eq!(result.tokens.expires_in, 900);
    }

    #[tokio::test]
    async fn test_login_wrong_password_and_unknown_user_are_indistinguishable() {
        let (service, _) = service_with_alice();

        let wrong_password = service.login("alice", "wrong-password").await;
        let unknown_user = service.login("ghost", "anything-at-all").await;

        assert!(matches!(wrong_password, Err(AppError::InvalidCredentials)));
        assert!(matches!(unknown_user, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_refresh_rotates_a_full_pair() {
        let (service, _) = service_with_alice();
        let tokens = jwt_manager();

        let login = service.login("alice", "correct-password").await.unwrap();
        let pair = service.refresh(&login.tokens.refresh_token).await.unwrap();

        let access = tokens.validate(&pair.access_token).unwrap();
        let refresh = tokens.validate(&pair.refresh_token).unwrap();
        assert_eq!(access.token_type, TokenType::Access);
        assert_eq!(refresh.token_type, TokenType::Refresh);
        assert_eq!(access.user_id, 1);
        assert_eq!(refresh.user_id, 1);
    }

    #[tokio::test]
    async fn test_refresh_rejects_an_access_token() {
        let (service, _) = service_with_alice();

        let login = service.login("alice", "correct-password").await.unwrap();
        let result = service.refresh(&login.tokens.access_token).await;

        assert!(matches!(result, Err(AppError::TokenInvalid)));
    }

    #[tokio::test]
    async fn test_refresh_fails_for_deleted_user() {
        let (service, store) = service_with_alice();

        let login = service.login("alice", "correct-password").await.unwrap();
        store.remove(1);

        let result = service.refresh(&login.tokens.refresh_token).await;
        assert!(matches!(result, Err(AppError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_current_user() {
        let (service, _) = service_with_alice();

        let user = service.current_user(1).await.unwrap();
        assert_eq!(user.username, "alice");

        let missing = service.current_user(999).await;
        assert!(matches!(missing, Err(AppError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_change_password_rejects_wrong_old_password() {
        let (service, store) = service_with_alice();
        let hash_before = store.password_hash(1).unwrap();

        let result = service
            .change_password(1, "not-the-old-password", "brand-new-password")
            .await;

        assert!(matches!(result, Err(AppError::InvalidOldPassword)));
        assert_eq!(store.password_hash(1).unwrap(), hash_before);
    }

    #[tokio::test]
    async fn test_change_password_persists_new_hash() {
        let (service, store) = service_with_alice();

        service
            .change_password(1, "correct-password", "brand-new-password")
            .await
            .unwrap();

        let hash = store.password_hash(1).unwrap();
        assert!(password::verify_password("brand-new-password", &hash));
        assert!(!password::verify_password("correct-password", &hash));
    }

    #[tokio::test]
    async fn test_change_password_for_vanished_user() {
        let (service, _) = service_with_alice();

        let result = service.change_password(999, "old", "newpass").await;
        assert!(matches!(result, Err(AppError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_update_profile_merges_only_provided_fields() {
        let (service, _) = service_with_alice();

        let update = UpdateProfileRequest {
            display_name: Some("Alice the Admin".to_string()),
            bio: Some("Writes about systems.".to_string()),
            ..Default::default()
        };
        let view = service.update_profile(1, &update).await.unwrap();

        assert_eq!(view.display_name, "Alice the Admin");
        assert_eq!(view.bio.as_deref(), Some("Writes about systems."));
        // Untouched fields keep their stored values.
        assert_eq!(view.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_update_profile_ignores_empty_strings() {
        let (service, _) = service_with_alice();

        let update = UpdateProfileRequest {
            display_name: Some(String::new()),
            ..Default::default()
        };
        let view = service.update_profile(1, &update).await.unwrap();

        assert_eq!(view.display_name, "alice");
    }

    #[tokio::test]
    async fn test_update_profile_for_missing_user() {
        let (service, _) = service_with_alice();

        let result = service
            .update_profile(999, &UpdateProfileRequest::default())
            .await;
        assert!(matches!(result, Err(AppError::UserNotFound)));
    }
}
