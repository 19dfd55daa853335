//! JWT token generation and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

use super::AuthError;
use crate::models::auth::{TokenClaims, UserClaim};

/// Default token lifetime: 24 hours.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Message for every verification failure; the cause is never disclosed.
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token";

/// Generate a signed JWT (HS256) for `claim`, valid for `ttl` from now.
pub fn issue_token(claim: &UserClaim, secret: &[u8], ttl: Duration) -> Result<String, AuthError> {
    issue_token_at(claim, secret, ttl, Utc::now())
}

/// Generate a signed JWT with an explicit issue time.
pub fn issue_token_at(
    claim: &UserClaim,
    secret: &[u8],
    ttl: Duration,
    issued_at: DateTime<Utc>,
) -> Result<String, AuthError> {
    let expires_at = issued_at
        .checked_add_signed(ttl)
        .ok_or_else(|| AuthError::Internal(format!("token expiry out of range: ttl {ttl}")))?;
    let claims = TokenClaims {
        user: claim.clone(),
        iat: issued_at.timestamp(),
        exp: expires_at.timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
}

/// Verify a JWT, returning the claims on success.
///
/// Malformed input, a bad signature and an elapsed expiry all yield the same
/// `TokenError`.
pub fn verify_token(token: &str, secret: &[u8]) -> Result<TokenClaims, AuthError> {
    let key = DecodingKey::from_secret(secret);
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    decode::<TokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(reason = %e, "token rejected");
            AuthError::TokenError(INVALID_TOKEN_MESSAGE.into())
        })
}
