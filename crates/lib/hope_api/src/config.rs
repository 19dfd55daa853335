//! API server configuration.

use std::collections::BTreeMap;
use std::fmt;

use chrono::Duration;
use hope_core::auth::jwt::DEFAULT_TOKEN_TTL_SECS;
use hope_core::config::{ConfigError, Environment, resolve_jwt_secret, webhook_secret_var};
use hope_core::webhook::signature::SignaturePolicy;
use tracing::warn;

/// Default listener address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Webhook sources accepted when `WEBHOOK_SOURCES` is unset.
pub const DEFAULT_WEBHOOK_SOURCES: &str = "mongodb";

/// Upper bound on `JWT_TTL_SECS`: ten years.
pub const MAX_TOKEN_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Configuration for the API server.
#[derive(Clone)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3000").
    pub bind_addr: String,
    /// Deployment environment.
    pub environment: Environment,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Lifetime of issued tokens.
    pub token_ttl: Duration,
    /// Accepted webhook sources and how each is authenticated.
    pub webhooks: WebhookConfig,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                    | Default                               |
    /// |-----------------------------|---------------------------------------|
    /// | `BIND_ADDR`                 | `127.0.0.1:3000`                      |
    /// | `APP_ENV`                   | `development`                         |
    /// | `JWT_SECRET` / `AUTH_SECRET`| dev fallback; required in production  |
    /// | `JWT_TTL_SECS`              | `86400`                               |
    /// | `WEBHOOK_SOURCES`           | `mongodb`                             |
    /// | `<SOURCE>_WEBHOOK_SECRET`   | unset                                 |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ApiConfig::from_env`] over an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let environment = Environment::resolve(&lookup)?;
        let jwt_secret = resolve_jwt_secret(environment, &lookup)?;
        let token_ttl = parse_ttl(lookup("JWT_TTL_SECS"))?;
        let sources = lookup("WEBHOOK_SOURCES").unwrap_or_else(|| DEFAULT_WEBHOOK_SOURCES.into());
        let webhooks = WebhookConfig::resolve(&sources, environment, &lookup);

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            environment,
            jwt_secret,
            token_ttl,
            webhooks,
        })
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("environment", &self.environment)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl.num_seconds())
            .field("webhooks", &self.webhooks)
            .finish()
    }
}

fn parse_ttl(raw: Option<String>) -> Result<Duration, ConfigError> {
    let Some(v) = raw else {
        return Ok(Duration::seconds(DEFAULT_TOKEN_TTL_SECS));
    };
    v.trim()
        .parse::<i64>()
        .ok()
        .filter(|secs| (1..=MAX_TOKEN_TTL_SECS).contains(secs))
        .and_then(Duration::try_seconds)
        .ok_or(ConfigError::InvalidValue {
            name: "JWT_TTL_SECS",
            value: v,
        })
}

/// Source names become part of a header name (`x-<source>-signature`) and a
/// URL path segment.
fn is_valid_source_name(source: &str) -> bool {
    source
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_')
}

/// Per-source webhook authentication.
#[derive(Clone, Debug, Default)]
pub struct WebhookConfig {
    sources: BTreeMap<String, SignaturePolicy>,
}

impl WebhookConfig {
    /// Build from a comma-separated source list; each source's secret is read
    /// from `<SOURCE>_WEBHOOK_SECRET`. Names outside `[a-z0-9_-]` (after
    /// lowercasing) are skipped with a warning.
    pub fn resolve(
        sources: &str,
        env: Environment,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let mut config = Self::default();
        for source in sources.split(',').map(|s| s.trim().to_ascii_lowercase()) {
            if source.is_empty() {
                continue;
            }
            if !is_valid_source_name(&source) {
                warn!(source = %source, "invalid webhook source name; source ignored");
                continue;
            }
            let secret = lookup(&webhook_secret_var(&source));
            let policy = SignaturePolicy::resolve(secret, env);
            match policy {
                SignaturePolicy::Open => warn!(
                    source = %source,
                    "no webhook secret configured; accepting unsigned requests (development only)"
                ),
                SignaturePolicy::Closed => warn!(
                    source = %source,
                    "no webhook secret configured; all requests will be rejected"
                ),
                SignaturePolicy::Secret(_) => {}
            }
            config.sources.insert(source, policy);
        }
        config
    }

    /// Add or replace a source.
    pub fn with_source(mut self, source: &str, policy: SignaturePolicy) -> Self {
        self.sources.insert(source.to_ascii_lowercase(), policy);
        self
    }

    /// Policy for a source, `None` if the source is not accepted.
    pub fn policy(&self, source: &str) -> Option<&SignaturePolicy> {
        self.sources.get(&source.to_ascii_lowercase())
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_in_development() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.token_ttl.num_seconds(), 24 * 60 * 60);
        assert_eq!(config.webhooks.policy("mongodb"), Some(&SignaturePolicy::Open));
    }

    #[test]
    fn production_requires_jwt_secret() {
        let err = ApiConfig::from_lookup(lookup(&[("APP_ENV", "production")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingSecret("JWT_SECRET"));
    }

    #[test]
    fn production_without_webhook_secret_is_closed() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("APP_ENV", "production"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .unwrap();
        assert_eq!(config.webhooks.policy("mongodb"), Some(&SignaturePolicy::Closed));
    }

    #[test]
    fn webhook_sources_and_secrets() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("WEBHOOK_SOURCES", "MongoDB, atlas ,"),
            ("MONGODB_WEBHOOK_SECRET", "m"),
        ]))
        .unwrap();
        let sources: Vec<_> = config.webhooks.sources().collect();
        assert_eq!(sources, ["atlas", "mongodb"]);
        assert_eq!(
            config.webhooks.policy("mongodb"),
            Some(&SignaturePolicy::Secret("m".into()))
        );
        assert!(config.webhooks.policy("github").is_none());
    }

    #[test]
    fn source_names_must_be_header_safe() {
        let config = ApiConfig::from_lookup(lookup(&[(
            "WEBHOOK_SOURCES",
            "mongodb,atlas app,change_stream,db-2,x:y,caf\u{e9}",
        )]))
        .unwrap();
        let sources: Vec<_> = config.webhooks.sources().collect();
        assert_eq!(sources, ["change_stream", "db-2", "mongodb"]);
    }

    #[test]
    fn invalid_ttl_rejected() {
        for bad in ["0", "-5", "soon"] {
            let err = ApiConfig::from_lookup(lookup(&[("JWT_TTL_SECS", bad)])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { name: "JWT_TTL_SECS", .. }));
        }
    }

    #[test]
    fn oversized_ttl_rejected() {
        let just_over = (MAX_TOKEN_TTL_SECS + 1).to_string();
        let max = i64::MAX.to_string();
        for bad in [just_over.as_str(), "1000000000000000", max.as_str()] {
            let err = ApiConfig::from_lookup(lookup(&[("JWT_TTL_SECS", bad)])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { name: "JWT_TTL_SECS", .. }));
        }

        let ceiling = MAX_TOKEN_TTL_SECS.to_string();
        let config = ApiConfig::from_lookup(lookup(&[("JWT_TTL_SECS", &ceiling)])).unwrap();
        assert_eq!(config.token_ttl.num_seconds(), MAX_TOKEN_TTL_SECS);
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "very-secret-value"),
            ("MONGODB_WEBHOOK_SECRET", "hook-secret-value"),
        ]))
        .unwrap();
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("very-secret-value"));
        assert!(!dbg.contains("hook-secret-value"));
    }
}
