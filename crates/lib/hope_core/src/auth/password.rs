//! Password hashing via bcrypt.
//!
//! bcrypt is deliberately slow; async callers go through the `*_blocking`
//! wrappers so the comparison runs off the executor threads.

use std::sync::LazyLock;

use tracing::error;

use super::AuthError;

/// bcrypt cost factor.
pub const BCRYPT_COST: u32 = 10;

const DUMMY_PASSWORD: &str = "hope-dummy-password";

/// Hash compared against when the username is unknown, so a miss costs
/// the same as a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> = LazyLock::new(|| {
    hash_password(DUMMY_PASSWORD)
        .inspect_err(|e| error!(error = %e, "failed to build dummy password hash"))
        .ok()
});

/// Build the dummy hash now rather than on the first unknown-user login.
/// Call from startup, off the async executor. Returns `false` if hashing
/// failed.
pub fn init_dummy_hash() -> bool {
    LazyLock::force(&DUMMY_HASH).is_some()
}

/// Hash a password with bcrypt (cost 10).
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    hash_password_with_cost(password, BCRYPT_COST)
}

/// Hash a password with an explicit bcrypt cost.
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(password, cost).map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash. A mismatch is `Ok(false)`.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash).map_err(|e| AuthError::Internal(format!("bcrypt verify: {e}")))
}

/// Burn one comparison's worth of time. The result is always discarded.
pub fn verify_dummy(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = bcrypt::verify(password, hash);
    }
}

/// [`verify_password`] on the blocking thread pool.
pub async fn verify_password_blocking(password: &str, hash: &str) -> Result<bool, AuthError> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::Internal(format!("bcrypt task: {e}")))?
}

/// [`verify_dummy`] on the blocking thread pool.
pub async fn verify_dummy_blocking(password: &str) {
    let password = password.to_string();
    let _ = tokio::task::spawn_blocking(move || verify_dummy(&password)).await;
}
