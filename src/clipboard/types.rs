/*!
 * Clipboard Types
 * The persisted payload, copy options and listener aliases
 */

use crate::core::listener::Listener;
use crate::core::types::is_truthy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Listener for clipboard changes: `(new_payload, old_payload, origin_address)`
pub type ClipboardListener = Listener<ClipboardPayload>;

/// The single clipboard entry, stored as one JSON object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardPayload {
    /// Copied content
    pub content: Value,
    /// Classification tag
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Caller-defined auxiliary data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl ClipboardPayload {
    /// Build a payload, keeping only the truthy optional fields
    ///
    /// An empty `kind` or `description` is dropped, as is a falsy `metadata`
    /// (`null`, `false`, `0`, `""`). `content` is always kept.
    #[must_use]
    pub fn new(content: Value, options: CopyOptions) -> Self {
        Self {
            content,
            kind: options.kind.filter(|s| !s.is_empty()),
            description: options.description.filter(|s| !s.is_empty()),
            metadata: options.metadata.filter(is_truthy),
        }
    }

    /// Decode a stored value
    ///
    /// Anything without a `content` field is not a payload and yields `None`.
    /// Optional fields of the wrong type are dropped individually, so the
    /// content survives a malformed `type` or `description`.
    #[must_use]
    pub fn from_stored(value: &Value) -> Option<Self> {
        let Some(content) = value.as_object().and_then(|object| object.get("content")) else {
            warn!("Stored clipboard value is not a payload");
            return None;
        };

        Some(Self {
            content: content.clone(),
            kind: stored_string(value, "type"),
            description: stored_string(value, "description"),
            metadata: value.get("metadata").filter(|v| !v.is_null()).cloned(),
        })
    }

    /// Encode for storage
    #[must_use]
    pub fn to_value(&self) -> Value {
        // A struct of JSON values with string keys always serializes
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn stored_string(value: &Value, field: &str) -> Option<String> {
    match value.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            warn!(field, found = %other, "Dropping clipboard field of unexpected type");
            None
        }
    }
}

/// Optional fields for a copy
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CopyOptions {
    /// Classification tag
    pub kind: Option<String>,
    /// Human-readable description
    pub description: Option<String>,
    /// Caller-defined auxiliary data
    pub metadata: Option<Value>,
}

impl CopyOptions {
    /// No optional fields
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the type tag
    #[must_use]
    pub fn with_type(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the metadata
    #[must_use]
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Clipboard statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardStats {
    /// Whether a payload with content is stored
    pub has_data: bool,
    /// Listeners in this context's local registry
    pub local_listeners: usize,
    /// Cross-context listeners registered through this clipboard
    pub remote_listeners: usize,
}
