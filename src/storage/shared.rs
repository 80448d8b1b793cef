/*!
 * Shared Store Backend
 * Origin-wide key-value map shared by every context, with quota and optional persistence
 */

use ahash::RandomState;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};

use super::context::ContextStore;
use super::persist;
use super::types::{StorageError, StorageEvent, StorageResult};
use crate::core::config::StoreConfig;
use crate::core::types::ContextId;

#[derive(Debug)]
struct StoreInner {
    /// Key -> encoded JSON text
    entries: DashMap<String, String, RandomState>,
    /// Bytes charged against the quota (key length + encoded value length)
    used_bytes: AtomicUsize,
    quota: Option<usize>,
    path: Option<PathBuf>,
    /// Serializes mutations: commit, snapshot and event publication happen as one step
    write_lock: Mutex<()>,
    events: broadcast::Sender<StorageEvent>,
}

/// Key-value store shared by all contexts of one origin
///
/// Cloning yields another handle to the same store. Contexts opened with
/// [`context`](SharedStore::context) read and write through it and hear about
/// each other's changes.
#[derive(Debug, Clone)]
pub struct SharedStore {
    inner: Arc<StoreInner>,
}

impl SharedStore {
    /// Volatile store with the default quota
    #[must_use]
    pub fn new() -> Self {
        Self::volatile(&StoreConfig::default())
    }

    /// Volatile store; `config.path` is ignored
    #[must_use]
    pub fn volatile(config: &StoreConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            inner: Arc::new(StoreInner {
                entries: DashMap::with_hasher(RandomState::new()),
                used_bytes: AtomicUsize::new(0),
                quota: config.quota_bytes,
                path: None,
                write_lock: Mutex::new(()),
                events,
            }),
        }
    }

    /// Open a store, loading `config.path` when set
    ///
    /// A missing file starts an empty store; it is created on the first write.
    pub fn open(config: &StoreConfig) -> StorageResult<Self> {
        let Some(path) = config.path.clone() else {
            return Ok(Self::volatile(config));
        };

        let loaded = persist::load(&path)?;
        let entries = DashMap::with_hasher(RandomState::new());
        let mut used = 0usize;
        for (key, text) in loaded {
            used += key.len() + text.len();
            entries.insert(key, text);
        }

        info!(path = %path.display(), keys = entries.len(), bytes = used, "Shared store opened");

        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Ok(Self {
            inner: Arc::new(StoreInner {
                entries,
                used_bytes: AtomicUsize::new(used),
                quota: config.quota_bytes,
                path: Some(path),
                write_lock: Mutex::new(()),
                events,
            }),
        })
    }

    /// Open a context without an address
    #[must_use]
    pub fn context(&self) -> ContextStore {
        ContextStore::new(self.clone(), None)
    }

    /// Open a context with the given address (e.g. the page URL)
    #[must_use]
    pub fn context_at(&self, address: impl Into<String>) -> ContextStore {
        ContextStore::new(self.clone(), Some(address.into()))
    }

    /// Read and decode the value under `key`
    pub fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        match self.inner.entries.get(key) {
            Some(text) => serde_json::from_str(text.value())
                .map(Some)
                .map_err(|e| StorageError::Deserialization(format!("{}: {}", key, e))),
            None => Ok(None),
        }
    }

    /// Encode and store `value`, then broadcast the change
    ///
    /// Returns the previous value. If the snapshot cannot be written the
    /// store is left exactly as it was and nothing is broadcast.
    pub(crate) fn insert(
        &self,
        key: &str,
        value: &Value,
        source: ContextId,
        url: Option<&str>,
    ) -> StorageResult<Option<Value>> {
        let encoded =
            serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        let new_size = key.len() + encoded.len();

        let _write = self.inner.write_lock.lock();

        let previous = match self.inner.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                let old_size = key.len() + occupied.get().len();
                self.charge(old_size, new_size)?;
                Some(occupied.insert(encoded))
            }
            Entry::Vacant(vacant) => {
                self.charge(0, new_size)?;
                vacant.insert(encoded);
                None
            }
        };

        if let Err(e) = self.flush() {
            self.restore(key, new_size, previous);
            return Err(e);
        }
        trace!(key, bytes = new_size, "Stored value");

        let old_value = previous.and_then(|text| serde_json::from_str(&text).ok());
        self.publish(StorageEvent {
            source,
            key: key.to_string(),
            new_value: Some(value.clone()),
            old_value: old_value.clone(),
            url: url.map(str::to_string),
        });

        Ok(old_value)
    }

    /// Delete `key` and broadcast the removal, returning the previous value
    ///
    /// Removing a missing key changes nothing and broadcasts nothing.
    pub(crate) fn delete(
        &self,
        key: &str,
        source: ContextId,
        url: Option<&str>,
    ) -> StorageResult<Option<Value>> {
        let _write = self.inner.write_lock.lock();

        let Some((_, text)) = self.inner.entries.remove(key) else {
            return Ok(None);
        };
        let size = key.len() + text.len();
        self.inner.used_bytes.fetch_sub(size, Ordering::SeqCst);

        if let Err(e) = self.flush() {
            self.inner.used_bytes.fetch_add(size, Ordering::SeqCst);
            self.inner.entries.insert(key.to_string(), text);
            warn!(key, error = %e, "Snapshot failed, removal rolled back");
            return Err(e);
        }
        trace!(key, "Removed value");

        let old_value: Option<Value> = serde_json::from_str(&text).ok();
        self.publish(StorageEvent {
            source,
            key: key.to_string(),
            new_value: None,
            old_value: old_value.clone(),
            url: url.map(str::to_string),
        });

        Ok(old_value)
    }

    /// Undo a committed insert whose snapshot failed; caller holds the write lock
    fn restore(&self, key: &str, charged: usize, previous: Option<String>) {
        self.inner.used_bytes.fetch_sub(charged, Ordering::SeqCst);
        match previous {
            Some(text) => {
                self.inner
                    .used_bytes
                    .fetch_add(key.len() + text.len(), Ordering::SeqCst);
                self.inner.entries.insert(key.to_string(), text);
            }
            None => {
                self.inner.entries.remove(key);
            }
        }
        warn!(key, "Snapshot failed, write rolled back");
    }

    /// Adjust the quota charge from `old_size` to `new_size`
    fn charge(&self, old_size: usize, new_size: usize) -> StorageResult<()> {
        loop {
            let current = self.inner.used_bytes.load(Ordering::SeqCst);
            let next = current.saturating_sub(old_size) + new_size;

            if let Some(quota) = self.inner.quota {
                if next > quota && new_size > old_size {
                    debug!(next, quota, "Store quota exceeded");
                    return Err(StorageError::QuotaExceeded { size: next, quota });
                }
            }

            if self
                .inner
                .used_bytes
                .compare_exchange(current, next, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return Ok(());
            }
        }
    }

    /// Write a snapshot to the persistence file, if any; caller holds the write lock
    fn flush(&self) -> StorageResult<()> {
        let Some(path) = self.inner.path.as_deref() else {
            return Ok(());
        };

        let snapshot = self
            .inner
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        persist::save(path, &snapshot)
    }

    /// Broadcast a change to every context
    fn publish(&self, event: StorageEvent) {
        // No receivers just means no other context is open
        let _ = self.inner.events.send(event);
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.inner.events.subscribe()
    }

    /// Number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    /// Whether the store holds no keys
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Bytes charged against the quota
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.inner.used_bytes.load(Ordering::SeqCst)
    }

    /// Configured quota
    #[must_use]
    pub fn quota(&self) -> Option<usize> {
        self.inner.quota
    }

    /// Persistence file, if any
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }
}

impl Default for SharedStore {
    fn default() -> Self {
        Self::new()
    }
}
