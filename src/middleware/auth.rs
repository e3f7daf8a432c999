use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::AppState;

/// Identity attached to a request after successful token validation.
/// Lives exactly as long as the request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

/// Gate for protected routes: demands a valid access-typed bearer token and
/// attaches `CurrentUser` for downstream handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Authorization header is required".to_string()))?;

    let token = parse_bearer(auth_header)
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header format".to_string()))?;

    // Refresh tokens are rejected here: only access-typed claims pass.
    let claims = state.tokens.validate_access(token)?;

    request.extensions_mut().insert(CurrentUser {
        id: claims.user_id,
        username: claims.username,
    });

    Ok(next.run(request).await)
}

/// Like `require_auth`, but any failure proceeds anonymously instead of
/// rejecting. For routes that behave differently for authenticated callers
/// without requiring authentication.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(parse_bearer)
        .and_then(|token| state.tokens.validate_access(token).ok());

    if let Some(claims) = claims {
        request.extensions_mut().insert(CurrentUser {
            id: claims.user_id,
            username: claims.username,
        });
    }

    next.run(request).await
}

/// `Bearer <token>`, scheme matched case-insensitively.
fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    (scheme.eq_ignore_ascii_case("Bearer") && !token.is_empty()).then_some(token)
}
