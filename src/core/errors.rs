/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export StorageError from storage module
pub use crate::storage::types::StorageError;

/// Clipboard errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ClipboardError {
    #[error("Storage error: {0}")]
    #[diagnostic(
        code(clipboard::storage),
        help("The underlying store rejected the operation. See the inner error.")
    )]
    Storage(#[from] StorageError),

    #[error("Invalid usage: {0}")]
    #[diagnostic(
        code(clipboard::invalid_usage),
        help("on_copy needs a live component to deliver changes to.")
    )]
    InvalidUsage(String),

    #[error("Observer is already attached")]
    #[diagnostic(
        code(clipboard::already_attached),
        help("Call detach() before attaching to another component.")
    )]
    AlreadyAttached,
}

/// Result type for clipboard operations
pub type ClipboardResult<T> = Result<T, ClipboardError>;
