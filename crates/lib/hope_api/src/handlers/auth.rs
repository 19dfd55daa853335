//! Authentication request handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use tracing::debug;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{LoginRequest, LoginResponse, MeResponse};
use crate::services::auth;

/// `POST /api/auth/login`: authenticate with username + password.
pub async fn login_handler(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let Json(body) = body.map_err(|e| {
        debug!(error = %e, "login body rejected");
        AppError::Validation("Please provide username and password".into())
    })?;
    let resp = auth::login(
        state.store.as_ref(),
        body.username.as_deref(),
        body.password.as_deref(),
        state.config.jwt_secret.as_bytes(),
        state.config.token_ttl,
    )
    .await?;
    Ok(Json(resp))
}

/// `GET /api/auth/me`: the authenticated user, without credentials.
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
) -> AppResult<Json<MeResponse>> {
    let resp = auth::current_user(state.store.as_ref(), &claims).await?;
    Ok(Json(resp))
}
