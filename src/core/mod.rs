/*!
 * Core Module
 * Shared types, listener handles, errors and configuration
 */

pub mod config;
pub mod errors;
pub mod listener;
pub mod types;

pub use config::{ClipboardConfig, StoreConfig, DEFAULT_EVENT_CAPACITY, DEFAULT_QUOTA_BYTES};
pub use errors::{ClipboardError, ClipboardResult, StorageError};
pub use listener::Listener;
pub use types::{is_truthy, ContextId, DEFAULT_CLIPBOARD_KEY};
