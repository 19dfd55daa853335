//! Authentication and authorization logic.
//!
//! Password verification, JWT issuance/verification and the credential
//! store abstraction shared by `hope_api` and the server binary.

pub mod jwt;
pub mod password;
pub mod store;

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    CredentialError,

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Credential store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
