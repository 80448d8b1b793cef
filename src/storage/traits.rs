/*!
 * Storage Traits
 * Key-value store abstraction with cross-context change subscription
 */

use serde_json::Value;

use super::types::{StorageListener, StorageResult};

/// Persistent key-value store shared by several execution contexts
///
/// Values are JSON. A write made through one context is reported to the
/// listeners registered (via [`on`](StorageAdapter::on)) in every *other*
/// context; writers are never notified of their own changes.
pub trait StorageAdapter: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> StorageResult<Option<Value>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &Value) -> StorageResult<()>;

    /// Delete `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Subscribe to changes of `key` made by other contexts
    fn on(&self, key: &str, listener: StorageListener);

    /// Unsubscribe the first registration identical to `listener`
    ///
    /// Returns whether a registration was removed.
    fn off(&self, key: &str, listener: &StorageListener) -> bool;

    /// Number of listeners currently registered for `key`
    fn listener_count(&self, key: &str) -> usize;

    /// Address of this context (e.g. the page URL), when it has one
    fn address(&self) -> Option<String> {
        None
    }
}
