//! Parse an accepted webhook body and route it by operation type.

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info};

use super::WebhookError;
use crate::models::webhook::{OperationKind, WebhookEvent};

/// Parse a raw body into an event. Valid JSON that is not an object is
/// treated as an empty event and lands in `Other`.
pub fn parse_event(body: &[u8]) -> Result<WebhookEvent, WebhookError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| WebhookError::Parse(e.to_string()))?;
    match value {
        Value::Object(_) => {
            serde_json::from_value(value).map_err(|e| WebhookError::Parse(e.to_string()))
        }
        _ => Ok(WebhookEvent::default()),
    }
}

/// Parse, classify and log an event. Returns its classification.
pub fn process(source: &str, body: &[u8]) -> Result<OperationKind, WebhookError> {
    let event = parse_event(body)?;
    let kind = event.kind();
    let timestamp = event.cluster_timestamp().unwrap_or_else(Utc::now);

    info!(
        source,
        operation_type = event.operation_type().unwrap_or("<none>"),
        namespace = %event.namespace(),
        %timestamp,
        "webhook received"
    );

    match kind {
        OperationKind::Insert => {
            debug!(source, document = ?event.full_document, "document inserted");
        }
        OperationKind::Update => {
            debug!(
                source,
                key = ?event.document_key,
                update = ?event.update_description,
                "document updated"
            );
        }
        OperationKind::Delete => {
            debug!(source, key = ?event.document_key, "document deleted");
        }
        OperationKind::Replace => {
            debug!(source, key = ?event.document_key, "document replaced");
        }
        OperationKind::Other => {
            debug!(
                source,
                operation_type = ?event.operation_type,
                "other operation type"
            );
        }
    }

    Ok(kind)
}
