//! Authentication middleware: Bearer token extraction and JWT verification.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use hope_core::auth::jwt::{INVALID_TOKEN_MESSAGE, verify_token};
use hope_core::models::auth::TokenClaims;
use tracing::debug;

use crate::AppState;
use crate::error::AppError;

/// Message when no token accompanies a request to a protected route.
pub const MISSING_TOKEN_MESSAGE: &str = "Access denied. No token provided.";

/// Key used to store `TokenClaims` in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub TokenClaims);

/// Token carried by an `Authorization` header value. The `Bearer ` prefix is
/// stripped when present; any other value is passed through as-is and will
/// fail verification.
fn bearer_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    (!token.is_empty()).then_some(token)
}

/// Axum middleware: extracts `Authorization: Bearer <token>`, verifies the JWT,
/// and injects `AuthenticatedUser` into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = match request.headers().get(AUTHORIZATION) {
        None => {
            debug!("auth: no Authorization header");
            return Err(AppError::Unauthorized(MISSING_TOKEN_MESSAGE.into()));
        }
        Some(value) => value.to_str().map_err(|_| {
            debug!("auth: Authorization header is not visible ASCII");
            AppError::Unauthorized(INVALID_TOKEN_MESSAGE.into())
        })?,
    };

    let token = bearer_token(header).ok_or_else(|| {
        debug!("auth: empty bearer token");
        AppError::Unauthorized(MISSING_TOKEN_MESSAGE.into())
    })?;

    let claims = verify_token(token, state.config.jwt_secret.as_bytes())?;

    request.extensions_mut().insert(AuthenticatedUser(claims));

    Ok(next.run(request).await)
}
