//! HMAC-SHA256 signature verification over raw webhook bodies.
//!
//! The signature must be computed over the exact bytes received. Parsing and
//! re-serializing the JSON first is not equivalent: key order, whitespace and
//! number formatting may all change.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, warn};

use super::WebhookError;
use crate::config::Environment;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 of `body` under `secret`.
pub fn sign(secret: &[u8], body: &[u8]) -> Result<String, WebhookError> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| WebhookError::Internal(format!("HMAC key error: {e}")))?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a hex signature header against `body`. An optional `sha256=`
/// prefix is accepted. Comparison is constant-time.
pub fn verify_signature(
    body: &[u8],
    signature: Option<&str>,
    secret: &[u8],
) -> Result<(), WebhookError> {
    let sig = signature
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(WebhookError::MissingSignature)?;
    let sig_hex = sig.strip_prefix("sha256=").unwrap_or(sig);
    let sig_bytes = hex::decode(sig_hex).map_err(|e| {
        debug!(error = %e, "webhook signature is not hex");
        WebhookError::InvalidSignature
    })?;

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| WebhookError::Internal(format!("HMAC key error: {e}")))?;
    mac.update(body);
    mac.verify_slice(&sig_bytes)
        .map_err(|_| WebhookError::InvalidSignature)
}

/// `true` when the request may be processed. With no secret every request is
/// accepted.
///
/// Boolean form of [`SignaturePolicy::check`] for a `Secret` or `Open`
/// policy; the HTTP handler uses `check` directly to map the failure reason
/// to a response.
pub fn accept(body: &[u8], signature: Option<&str>, secret: Option<&str>) -> bool {
    let policy = match secret {
        Some(secret) => SignaturePolicy::Secret(secret.to_string()),
        None => SignaturePolicy::Open,
    };
    policy.check(body, signature).is_ok()
}

/// How a webhook source authenticates requests.
#[derive(Clone, PartialEq, Eq)]
pub enum SignaturePolicy {
    /// Require an HMAC signature under this secret.
    Secret(String),
    /// No secret configured, development only: accept unsigned requests.
    Open,
    /// No secret configured in production: reject everything.
    Closed,
}

impl SignaturePolicy {
    /// Policy for a source given its (optional) secret and the environment.
    pub fn resolve(secret: Option<String>, env: Environment) -> Self {
        match secret {
            Some(s) if !s.is_empty() => SignaturePolicy::Secret(s),
            _ if env.is_production() => SignaturePolicy::Closed,
            _ => SignaturePolicy::Open,
        }
    }

    pub fn check(&self, body: &[u8], signature: Option<&str>) -> Result<(), WebhookError> {
        match self {
            SignaturePolicy::Secret(secret) => {
                verify_signature(body, signature, secret.as_bytes()).inspect_err(|e| {
                    warn!(error = %e, "webhook signature verification failed");
                })
            }
            SignaturePolicy::Open => {
                debug!("webhook accepted without signature (open mode)");
                Ok(())
            }
            SignaturePolicy::Closed => {
                warn!("webhook rejected: no signing secret configured");
                Err(WebhookError::SigningDisabled)
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SignaturePolicy::Secret(_) => "signed",
            SignaturePolicy::Open => "open",
            SignaturePolicy::Closed => "closed",
        }
    }
}

impl std::fmt::Debug for SignaturePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec-test";
    const BODY: &[u8] = br#"{"operationType":"insert","ns":{"db":"hope","coll":"users"}}"#;

    #[test]
    fn valid_signature_accepted() {
        let sig = sign(SECRET.as_bytes(), BODY).unwrap();
        assert!(verify_signature(BODY, Some(&sig), SECRET.as_bytes()).is_ok());
        assert!(accept(BODY, Some(&sig), Some(SECRET)));
    }

    #[test]
    fn prefixed_and_uppercase_signature_accepted() {
        let sig = sign(SECRET.as_bytes(), BODY).unwrap();
        let prefixed = format!("sha256={sig}");
        assert!(verify_signature(BODY, Some(&prefixed), SECRET.as_bytes()).is_ok());
        let upper = sig.to_uppercase();
        assert!(verify_signature(BODY, Some(&upper), SECRET.as_bytes()).is_ok());
    }

    #[test]
    fn missing_signature_rejected() {
        let err = verify_signature(BODY, None, SECRET.as_bytes()).unwrap_err();
        assert!(matches!(err, WebhookError::MissingSignature));
        let err = verify_signature(BODY, Some("  "), SECRET.as_bytes()).unwrap_err();
        assert!(matches!(err, WebhookError::MissingSignature));
        assert!(!accept(BODY, None, Some(SECRET)));
    }

    #[test]
    fn wrong_signature_rejected() {
        let sig = sign(b"other-secret", BODY).unwrap();
        let err = verify_signature(BODY, Some(&sig), SECRET.as_bytes()).unwrap_err();
        assert!(matches!(err, WebhookError::InvalidSignature));
        let err = verify_signature(BODY, Some("zz-not-hex"), SECRET.as_bytes()).unwrap_err();
        assert!(matches!(err, WebhookError::InvalidSignature));
    }

    #[test]
    fn reserialized_body_signature_rejected() {
        // Same JSON value, different bytes.
        let value: serde_json::Value = serde_json::from_slice(BODY).unwrap();
        let pretty = serde_json::to_vec_pretty(&value).unwrap();
        assert_ne!(pretty.as_slice(), BODY);
        let sig_over_reserialized = sign(SECRET.as_bytes(), &pretty).unwrap();
        assert!(!accept(BODY, Some(&sig_over_reserialized), Some(SECRET)));
    }

    #[test]
    fn no_secret_accepts_everything() {
        assert!(accept(BODY, None, None));
        assert!(accept(b"not even json", Some("junk"), None));
    }

    #[test]
    fn accept_agrees_with_policy_check() {
        let good = sign(SECRET.as_bytes(), BODY).unwrap();
        let bad = sign(b"other-secret", BODY).unwrap();
        for signature in [None, Some(""), Some("zz"), Some(bad.as_str()), Some(good.as_str())] {
            let secret = SignaturePolicy::Secret(SECRET.into());
            assert_eq!(
                accept(BODY, signature, Some(SECRET)),
                secret.check(BODY, signature).is_ok(),
                "{signature:?}"
            );
            assert_eq!(
                accept(BODY, signature, None),
                SignaturePolicy::Open.check(BODY, signature).is_ok()
            );
        }
    }

    #[test]
    fn policy_resolution() {
        assert_eq!(
            SignaturePolicy::resolve(None, Environment::Development),
            SignaturePolicy::Open
        );
        assert_eq!(
            SignaturePolicy::resolve(Some(String::new()), Environment::Production),
            SignaturePolicy::Closed
        );
        assert_eq!(
            SignaturePolicy::resolve(Some("s".into()), Environment::Production),
            SignaturePolicy::Secret("s".into())
        );
    }

    #[test]
    fn closed_policy_rejects_even_signed_requests() {
        let sig = sign(SECRET.as_bytes(), BODY).unwrap();
        let err = SignaturePolicy::Closed.check(BODY, Some(&sig)).unwrap_err();
        assert!(matches!(err, WebhookError::SigningDisabled));
        assert!(err.is_auth_failure());
    }

    #[test]
    fn debug_does_not_print_secret() {
        let dbg = format!("{:?}", SignaturePolicy::Secret(SECRET.into()));
        assert!(!dbg.contains(SECRET));
    }
}
