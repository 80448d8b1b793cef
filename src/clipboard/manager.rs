/*!
 * Clipboard Manager
 * Single shared clipboard slot with local and cross-context listeners
 */

use super::types::{ClipboardListener, ClipboardPayload, ClipboardStats, CopyOptions};
use crate::core::config::ClipboardConfig;
use crate::core::errors::ClipboardResult;
use crate::core::listener::remove_first;
use crate::core::types::is_truthy;
use crate::monitoring::NotifySpan;
use crate::storage::{StorageAdapter, StorageListener};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, trace};

/// A cross-context listener and the storage listener registered on its behalf
struct RemoteRegistration {
    listener: ClipboardListener,
    bridge: StorageListener,
}

/// Clipboard backed by a storage adapter
///
/// One instance per context. The payload itself lives in the store, so every
/// context built over the same store sees the same clipboard.
pub struct Clipboard {
    store: Arc<dyn StorageAdapter>,
    key: String,
    /// Local listeners, in registration order
    local: RwLock<Vec<ClipboardListener>>,
    /// Cross-context listeners registered through `listen`
    remote: Mutex<Vec<RemoteRegistration>>,
}

impl Clipboard {
    /// Create a clipboard over `store` using the default key
    #[must_use]
    pub fn new(store: Arc<dyn StorageAdapter>) -> Self {
        Self::with_config(store, ClipboardConfig::default())
    }

    /// Create a clipboard with explicit configuration
    #[must_use]
    pub fn with_config(store: Arc<dyn StorageAdapter>, config: ClipboardConfig) -> Self {
        info!(key = %config.key, "Clipboard initialized");
        Self {
            store,
            key: config.key,
            local: RwLock::new(Vec::new()),
            remote: Mutex::new(Vec::new()),
        }
    }

    /// Storage key of the payload
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Replace the clipboard contents
    ///
    /// Local listeners run first, in registration order, with the payload
    /// about to be written and the value it replaces. The write happens after
    /// they return. A panicking listener unwinds through this call, so the
    /// listeners after it and the write itself are skipped.
    #[instrument(skip(self, content, options), fields(key = %self.key))]
    pub fn copy(&self, content: Value, options: CopyOptions) -> ClipboardResult<()> {
        let payload = ClipboardPayload::new(content, options);

        let listeners = self.local.read().clone();
        if !listeners.is_empty() {
            let old = self.current()?;
            let url = self.store.address();
            let notify = NotifySpan::new("local", &self.key, listeners.len());
            let _entered = notify.enter();
            for listener in &listeners {
                listener.call(Some(&payload), old.as_ref(), url.as_deref());
            }
        }

        self.store.set(&self.key, &payload.to_value())?;
        debug!(
            kind = ?payload.kind,
            has_metadata = payload.metadata.is_some(),
            "Copied to clipboard"
        );
        Ok(())
    }

    /// Whether a payload with a `content` field is stored
    ///
    /// Any content counts, falsy values (`0`, `""`, `false`, `null`) included.
    /// Compare [`paste`](Self::paste), which treats falsy content as absent.
    pub fn has_data(&self) -> ClipboardResult<bool> {
        Ok(self
            .raw()?
            .as_ref()
            .and_then(Value::as_object)
            .is_some_and(|object| object.contains_key("content")))
    }

    /// The stored content, if present and truthy
    ///
    /// Falsy content reads as `None` here even though
    /// [`has_data`](Self::has_data) reports it.
    pub fn paste(&self) -> ClipboardResult<Option<Value>> {
        self.truthy_field("content")
    }

    /// The payload's type tag, if present and non-empty
    pub fn get_type(&self) -> ClipboardResult<Option<String>> {
        self.string_field("type")
    }

    /// The payload's description, if present and non-empty
    pub fn get_description(&self) -> ClipboardResult<Option<String>> {
        self.string_field("description")
    }

    /// The payload's metadata, if present and truthy
    pub fn get_metadata(&self) -> ClipboardResult<Option<Value>> {
        self.truthy_field("metadata")
    }

    /// The whole stored payload, if it decodes as one
    pub fn current(&self) -> ClipboardResult<Option<ClipboardPayload>> {
        Ok(self.raw()?.as_ref().and_then(ClipboardPayload::from_stored))
    }

    /// Delete the payload. No local listener runs.
    pub fn clear(&self) -> ClipboardResult<()> {
        self.store.remove(&self.key)?;
        debug!(key = %self.key, "Clipboard cleared");
        Ok(())
    }

    /// Append a local listener; the same listener may be added more than once
    pub fn add_local_listener(&self, listener: ClipboardListener) {
        let mut local = self.local.write();
        local.push(listener);
        trace!(count = local.len(), "Local listener added");
    }

    /// Remove the first registration of `listener`
    ///
    /// Returns whether one was found.
    pub fn remove_local_listener(&self, listener: &ClipboardListener) -> bool {
        let mut local = self.local.write();
        let removed = remove_first(&mut *local, listener);
        trace!(removed, count = local.len(), "Local listener removal");
        removed
    }

    /// Subscribe to clipboard changes made by other contexts
    pub fn listen(&self, listener: ClipboardListener) {
        let target = listener.clone();
        let bridge = StorageListener::new(move |new, old, url| {
            let new = new.and_then(ClipboardPayload::from_stored);
            let old = old.and_then(ClipboardPayload::from_stored);
            target.call(new.as_ref(), old.as_ref(), url);
        });

        self.store.on(&self.key, bridge.clone());
        self.remote
            .lock()
            .push(RemoteRegistration { listener, bridge });
        trace!(key = %self.key, "Cross-context listener added");
    }

    /// Remove the first cross-context registration of `listener`
    ///
    /// Returns whether one was found.
    pub fn unlisten(&self, listener: &ClipboardListener) -> bool {
        let registration = {
            let mut remote = self.remote.lock();
            let Some(index) = remote.iter().position(|r| r.listener.same(listener)) else {
                return false;
            };
            remote.remove(index)
        };

        self.store.off(&self.key, &registration.bridge);
        trace!(key = %self.key, "Cross-context listener removed");
        true
    }

    /// Number of local listeners
    #[must_use]
    pub fn local_listener_count(&self) -> usize {
        self.local.read().len()
    }

    /// Number of cross-context listeners registered through this clipboard
    #[must_use]
    pub fn remote_listener_count(&self) -> usize {
        self.remote.lock().len()
    }

    /// Get clipboard statistics
    pub fn stats(&self) -> ClipboardResult<ClipboardStats> {
        Ok(ClipboardStats {
            has_data: self.has_data()?,
            local_listeners: self.local_listener_count(),
            remote_listeners: self.remote_listener_count(),
        })
    }

    fn raw(&self) -> ClipboardResult<Option<Value>> {
        Ok(self.store.get(&self.key)?)
    }

    fn truthy_field(&self, field: &str) -> ClipboardResult<Option<Value>> {
        Ok(self.raw()?.and_then(|mut stored| {
            stored
                .as_object_mut()
                .and_then(|object| object.remove(field))
                .filter(is_truthy)
        }))
    }

    fn string_field(&self, field: &str) -> ClipboardResult<Option<String>> {
        Ok(self.truthy_field(field)?.and_then(|value| match value {
            Value::String(s) => Some(s),
            _ => None,
        }))
    }
}

impl fmt::Debug for Clipboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clipboard")
            .field("key", &self.key)
            .field("local_listeners", &self.local_listener_count())
            .field("remote_listeners", &self.remote_listener_count())
            .finish_non_exhaustive()
    }
}
