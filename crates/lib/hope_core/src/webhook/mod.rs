//! Inbound database-event webhooks.
//!
//! `signature` authenticates the raw body, `dispatch` parses and classifies
//! it once it has been accepted.

pub mod dispatch;
pub mod signature;

use thiserror::Error;

/// Webhook errors.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Signature missing")]
    MissingSignature,

    #[error("Signature invalid")]
    InvalidSignature,

    #[error("Webhook signing secret not configured")]
    SigningDisabled,

    #[error("Invalid payload: {0}")]
    Parse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WebhookError {
    /// Whether the error is an authentication failure (as opposed to a
    /// processing failure).
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            WebhookError::MissingSignature
                | WebhookError::InvalidSignature
                | WebhookError::SigningDisabled
        )
    }
}
