/*!
 * Cross-Context Clipboard
 * One typed clipboard slot shared by every context of a key-value store
 */

pub mod clipboard;
pub mod core;
pub mod monitoring;
pub mod observer;
pub mod storage;

// Re-exports
pub use clipboard::{Clipboard, ClipboardListener, ClipboardPayload, ClipboardStats, CopyOptions};
pub use crate::core::{
    is_truthy, ClipboardConfig, ClipboardError, ClipboardResult, ContextId, Listener, StorageError,
    StoreConfig, DEFAULT_CLIPBOARD_KEY,
};
pub use monitoring::init_tracing;
pub use observer::{on_copy, CopyMethod, LifecycleHooks, OnCopy};
pub use storage::{
    ContextStore, SharedStore, StorageAdapter, StorageEvent, StorageListener, StorageResult,
};
