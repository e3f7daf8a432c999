use axum::{
    extract::rejection::JsonRejection,
    extract::State,
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::{require_auth, CurrentUser};
use crate::models::{
    ChangePasswordRequest, LoginRequest, RefreshRequest, UpdateProfileRequest, UserResponse,
};
use crate::response::ApiResponse;
use crate::security::jwt::TokenPair;
use crate::services::LoginResult;
use crate::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/password", put(change_password))
        .route("/profile", put(update_profile))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .merge(protected)
}

/// Unwrap a JSON body, mapping extractor rejections to a uniform 400.
fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(inner)| inner)
        .map_err(|_| AppError::BadRequest("Invalid request body".to_string()))
}

/// POST /api/v1/auth/login
async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiResponse<LoginResult>> {
    let payload = body(payload)?;
    payload
        .validate()
        .map_err(|_| AppError::Validation("Username and password are required".to_string()))?;

    let result = state.auth.login(&payload.username, &payload.password).await?;
    Ok(ApiResponse::ok(result))
}

/// POST /api/v1/auth/refresh
async fn refresh(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<ApiResponse<TokenPair>> {
    let payload = body(payload)?;
    payload
        .validate()
        .map_err(|_| AppError::Validation("Refresh token is required".to_string()))?;

    let tokens = state.auth.refresh(&payload.refresh_token).await?;
    Ok(ApiResponse::ok(tokens))
}

/// POST /api/v1/auth/logout
async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResponse<()> {
    state.auth.logout(user.id);
    ApiResponse::message("Logged out successfully")
}

/// GET /api/v1/auth/me
async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<ApiResponse<UserResponse>> {
    let user = state.auth.current_user(user.id).await?;
    Ok(ApiResponse::ok(user))
}

/// PUT /api/v1/auth/password
async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: std::result::Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<ApiResponse<()>> {
    let payload = body(payload)?;
    payload.validate().map_err(|_| {
        AppError::Validation("Both old and new passwords are required".to_string())
    })?;

    state
        .auth
        .change_password(user.id, &payload.old_password, &payload.new_password)
        .await?;
    Ok(ApiResponse::message("Password changed successfully"))
}

/// PUT /api/v1/auth/profile
async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: std::result::Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<ApiResponse<UserResponse>> {
    let payload = body(payload)?.normalized();
    payload
        .validate()
        .map_err(|_| AppError::Validation("Invalid profile data".to_string()))?;

    let updated = state.auth.update_profile(user.id, &payload).await?;
    Ok(ApiResponse::ok_with_message(
        updated,
        "Profile updated successfully",
    ))
}
