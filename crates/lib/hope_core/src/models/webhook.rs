//! Database change-event payloads received over webhooks.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Classification of a change event by its `operationType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Insert,
    Update,
    Delete,
    Replace,
    Other,
}

impl OperationKind {
    /// Map a raw `operationType` to a kind. Anything unknown is `Other`.
    pub fn classify(operation_type: Option<&str>) -> Self {
        match operation_type {
            Some("insert") => OperationKind::Insert,
            Some("update") => OperationKind::Update,
            Some("delete") => OperationKind::Delete,
            Some("replace") => OperationKind::Replace,
            _ => OperationKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Insert => "insert",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
            OperationKind::Replace => "replace",
            OperationKind::Other => "other",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A change-stream event. Every field is optional on the wire so that a
/// partial payload still classifies instead of failing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    pub operation_type: Option<Value>,
    /// Namespace, usually `{"db": .., "coll": ..}`.
    pub ns: Option<Value>,
    pub document_key: Option<Value>,
    pub full_document: Option<Value>,
    pub update_description: Option<Value>,
    /// Extended-JSON timestamp: `{"$timestamp": {"t": secs, "i": inc}}`.
    pub cluster_time: Option<Value>,
}

impl WebhookEvent {
    /// Raw `operationType`, when it is a string.
    pub fn operation_type(&self) -> Option<&str> {
        self.operation_type.as_ref().and_then(Value::as_str)
    }

    pub fn kind(&self) -> OperationKind {
        OperationKind::classify(self.operation_type())
    }

    /// Namespace rendered as `db.coll` when possible.
    pub fn namespace(&self) -> String {
        match &self.ns {
            Some(Value::Object(map)) => {
                let db = map.get("db").and_then(Value::as_str);
                let coll = map.get("coll").and_then(Value::as_str);
                match (db, coll) {
                    (Some(db), Some(coll)) => format!("{db}.{coll}"),
                    (Some(db), None) => db.to_string(),
                    _ => Value::Object(map.clone()).to_string(),
                }
            }
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    /// Cluster time as a UTC timestamp, if present and well-formed.
    pub fn cluster_timestamp(&self) -> Option<DateTime<Utc>> {
        let secs = self
            .cluster_time
            .as_ref()?
            .get("$timestamp")?
            .get("t")?
            .as_i64()?;
        DateTime::from_timestamp(secs, 0)
    }
}
