//! Deployment environment and secret resolution.
//!
//! Secrets are looked up through a caller-supplied function so resolution can
//! be exercised without touching the process environment.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::warn;

/// Development-only JWT signing secret. Never accepted in production.
pub const INSECURE_DEV_JWT_SECRET: &str = "hope-insecure-dev-secret-change-me";

/// Configuration errors surfaced at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set when APP_ENV=production")]
    MissingSecret(&'static str),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Deployment environment, from `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Resolve from an env lookup; unset means development.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        match lookup("APP_ENV") {
            Some(v) if !v.trim().is_empty() => v.parse(),
            _ => Ok(Environment::Development),
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" | "test" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue {
                name: "APP_ENV",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => f.write_str("development"),
            Environment::Production => f.write_str("production"),
        }
    }
}

/// Resolve the JWT secret: `JWT_SECRET` → `AUTH_SECRET` → development fallback.
///
/// In production a missing secret is an error and the server must not start.
pub fn resolve_jwt_secret(
    env: Environment,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    for name in ["JWT_SECRET", "AUTH_SECRET"] {
        if let Some(secret) = lookup(name)
            && !secret.is_empty()
        {
            return Ok(secret);
        }
    }
    if env.is_production() {
        return Err(ConfigError::MissingSecret("JWT_SECRET"));
    }
    warn!("JWT_SECRET not set; signing tokens with the insecure development secret");
    Ok(INSECURE_DEV_JWT_SECRET.to_string())
}

/// Env var holding the shared webhook secret for a source, e.g.
/// `mongodb` → `MONGODB_WEBHOOK_SECRET`.
pub fn webhook_secret_var(source: &str) -> String {
    let upper: String = source
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{upper}_WEBHOOK_SECRET")
}
