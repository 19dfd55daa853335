//! Database webhook receiver.
//!
//! The body is taken as raw bytes so the signature is checked against exactly
//! what was sent; it is parsed only after the check passes.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use hope_core::webhook::{WebhookError, dispatch};
use tracing::{error, warn};

use crate::AppState;
use crate::models::{WebhookAck, WebhookErrorResponse};

/// Signature header for a source, e.g. `x-mongodb-signature`.
pub fn signature_header(source: &str) -> String {
    format!("x-{}-signature", source.to_ascii_lowercase())
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(WebhookErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

fn webhook_error_response(source: &str, e: WebhookError) -> Response {
    if e.is_auth_failure() {
        return error_response(StatusCode::UNAUTHORIZED, &e.to_string());
    }
    error!(source, error = %e, "error processing webhook");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

/// `POST /api/webhooks/{source}`: verify, classify and log a change event.
pub async fn webhook_handler(
    State(state): State<AppState>,
    Path(source): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(policy) = state.config.webhooks.policy(&source) else {
        warn!(source = %source, "webhook for unknown source");
        return error_response(StatusCode::NOT_FOUND, "Unknown webhook source");
    };

    let signature = headers
        .get(signature_header(&source).as_str())
        .and_then(|v| v.to_str().ok());

    if let Err(e) = policy.check(&body, signature) {
        return webhook_error_response(&source, e);
    }

    match dispatch::process(&source, &body) {
        Ok(_) => (StatusCode::OK, Json(WebhookAck { received: true })).into_response(),
        Err(e) => webhook_error_response(&source, e),
    }
}
