/*!
 * Storage Types
 * Change events and structured errors for the key-value store
 */

use crate::core::listener::Listener;
use crate::core::types::ContextId;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Storage operation result
pub type StorageResult<T> = Result<T, StorageError>;

/// Listener registered against a storage key
pub type StorageListener = Listener<Value>;

/// A change to one key, as seen by other contexts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageEvent {
    /// Context that performed the write
    pub source: ContextId,
    /// Key that changed
    pub key: String,
    /// Value after the change; `None` when the key was removed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
    /// Value before the change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    /// Address of the writing context, if it has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Storage errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
#[non_exhaustive]
pub enum StorageError {
    #[error("Quota exceeded: {size} bytes (quota: {quota})")]
    #[diagnostic(
        code(storage::quota_exceeded),
        help("Clear unused keys or raise the store quota.")
    )]
    QuotaExceeded { size: usize, quota: usize },

    #[error("Serialization error: {0}")]
    #[diagnostic(code(storage::serialization))]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    #[diagnostic(
        code(storage::deserialization),
        help("The stored value is not valid JSON. It may have been written by another tool.")
    )]
    Deserialization(String),

    #[error("I/O error: {0}")]
    #[diagnostic(
        code(storage::io),
        help("Check that the persistence file is readable and its directory writable.")
    )]
    Io(String),

    #[error("Event dispatcher already running for this context")]
    #[diagnostic(
        code(storage::dispatcher_running),
        help("A context delivers its events either by polling or from one spawned task, not both.")
    )]
    DispatcherRunning,
}
