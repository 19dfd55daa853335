//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use chrono::Duration;
use hope_api::config::{ApiConfig, WebhookConfig};
use hope_api::{AppState, router};
use hope_core::auth::store::{InMemoryCredentialStore, SeedUser};
use hope_core::config::Environment;
use hope_core::models::auth::Role;
use hope_core::webhook::signature::SignaturePolicy;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "integration-secret";
pub const WEBHOOK_SECRET: &str = "integration-webhook-secret";

pub fn seed() -> Vec<SeedUser> {
    vec![
        SeedUser {
            username: "admin".into(),
            password: "admin123".into(),
            name: "Administrator".into(),
            role: Role::Admin,
        },
        SeedUser {
            username: "user".into(),
            password: "user123".into(),
            name: "Default User".into(),
            role: Role::User,
        },
    ]
}

pub fn config(webhooks: WebhookConfig) -> ApiConfig {
    ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        environment: Environment::Development,
        jwt_secret: JWT_SECRET.into(),
        token_ttl: Duration::hours(24),
        webhooks,
    }
}

/// Router with the seeded users and a signed `mongodb` source plus an
/// unsigned `dev` source.
pub fn app() -> Router {
    let webhooks = WebhookConfig::default()
        .with_source("mongodb", SignaturePolicy::Secret(WEBHOOK_SECRET.into()))
        .with_source("dev", SignaturePolicy::Open)
        .with_source("locked", SignaturePolicy::Closed);
    app_with(config(webhooks))
}

pub fn app_with(config: ApiConfig) -> Router {
    let store = InMemoryCredentialStore::from_seed(&seed(), 4).expect("seed store");
    router(AppState {
        store: Arc::new(store),
        config,
    })
}

pub async fn send(app: Router, req: Request<Body>) -> (Response<Body>, serde_json::Value) {
    let resp = app.oneshot(req).await.expect("request");
    let (parts, body) = resp.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("read body");
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse JSON")
    };
    (Response::from_parts(parts, Body::empty()), json)
}

pub fn json_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
