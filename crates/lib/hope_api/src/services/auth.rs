//! Authentication service: login and current-user flows delegating to
//! `hope_core::auth`.

use chrono::Duration;
use hope_core::auth::jwt::issue_token;
use hope_core::auth::password::{verify_dummy_blocking, verify_password_blocking};
use hope_core::auth::store::CredentialStore;
use hope_core::models::auth::TokenClaims;
use tracing::{debug, info};

use crate::error::{AppError, AppResult, INVALID_CREDENTIALS};
use crate::models::{LoginResponse, MeResponse};

fn present(field: Option<&str>) -> Option<&str> {
    field.filter(|v| !v.is_empty())
}

/// Authenticate with username + password and issue a token.
///
/// An unknown username and a wrong password produce the same error, and both
/// cost one bcrypt comparison.
pub async fn login(
    store: &dyn CredentialStore,
    username: Option<&str>,
    password: Option<&str>,
    jwt_secret: &[u8],
    token_ttl: Duration,
) -> AppResult<LoginResponse> {
    let (Some(username), Some(password)) = (present(username), present(password)) else {
        return Err(AppError::Validation(
            "Please provide username and password".into(),
        ));
    };

    let user = match store.find_by_username(username).await? {
        Some(user) => user,
        None => {
            verify_dummy_blocking(password).await;
            debug!(username, "login rejected");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        }
    };

    if !verify_password_blocking(password, &user.password_hash).await? {
        debug!(username, "login rejected");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    let token = issue_token(&user.claim(), jwt_secret, token_ttl)?;
    info!(user_id = user.id, username, role = %user.role, "login succeeded");

    Ok(LoginResponse {
        success: true,
        token,
        user: user.summary(),
    })
}

/// Resolve the authenticated user. The token may outlive the account, in
/// which case this is `NotFound`.
pub async fn current_user(
    store: &dyn CredentialStore,
    claims: &TokenClaims,
) -> AppResult<MeResponse> {
    let user = store
        .find_by_id(claims.user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(MeResponse {
        success: true,
        user: user.summary(),
    })
}
