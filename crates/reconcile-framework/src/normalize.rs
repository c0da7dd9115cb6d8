//! Strips server-generated timestamps from fetched documents so that repeated reads of an
//! unchanged object produce identical text.

use crate::error::ReconcileError;
use serde_json::{Map, Value};

/// Top-level fields the control plane injects on every write.
pub const SERVER_GENERATED_FIELDS: [&str; 2] = ["creationTime", "modificationTime"];

/// Parses `raw` as a JSON object, drops [`SERVER_GENERATED_FIELDS`] and re-serializes compactly.
///
/// Field order and every other value are kept as received, so `normalize` is idempotent.
pub fn normalize(raw: &[u8]) -> Result<String, ReconcileError> {
    let mut document: Map<String, Value> = serde_json::from_slice(raw)
        .map_err(|e| ReconcileError::MalformedDocument(format!("fail unmarshalling: {}", e)))?;
    for field in SERVER_GENERATED_FIELDS {
        document.shift_remove(field);
    }
    serde_json::to_string(&document)
        .map_err(|e| ReconcileError::MalformedDocument(format!("fail marshalling: {}", e)))
}
