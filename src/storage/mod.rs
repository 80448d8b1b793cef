/*!
 * Storage Module
 * Persistent key-value store with cross-context change notification
 */

pub mod context;
mod persist;
pub mod shared;
pub mod traits;
pub mod types;

// Re-exports
pub use context::ContextStore;
pub use shared::SharedStore;
pub use traits::StorageAdapter;
pub use types::{StorageError, StorageEvent, StorageListener, StorageResult};
