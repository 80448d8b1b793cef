/*!
 * Configuration
 *
 * Runtime configuration for the clipboard and its reference store
 */

use super::types::DEFAULT_CLIPBOARD_KEY;
use std::path::PathBuf;
use tracing::warn;

/// Default store quota, in bytes of encoded JSON (5 MiB)
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Default cross-context event channel capacity
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Clipboard configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardConfig {
    /// Storage key holding the payload
    pub key: String,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            key: DEFAULT_CLIPBOARD_KEY.to_string(),
        }
    }
}

impl ClipboardConfig {
    /// Read configuration from the environment
    ///
    /// Environment variables:
    /// - CLIPBOARD_STORAGE_KEY: storage key (default: LOCAL_CLIPBOARD)
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var("CLIPBOARD_STORAGE_KEY") {
            if !key.is_empty() {
                config.key = key;
            }
        }
        config
    }

    /// Use a different storage key
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }
}

/// Shared store configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Maximum total size of stored values; `None` disables the check
    pub quota_bytes: Option<usize>,
    /// JSON file the store is loaded from and written through to
    pub path: Option<PathBuf>,
    /// Capacity of the broadcast channel carrying change events
    pub event_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            quota_bytes: Some(DEFAULT_QUOTA_BYTES),
            path: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl StoreConfig {
    /// Volatile store without a quota, for tests and scratch use
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            quota_bytes: None,
            path: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Read configuration from the environment
    ///
    /// Environment variables:
    /// - CLIPBOARD_STORAGE_PATH: persistence file (default: none, volatile)
    /// - CLIPBOARD_STORAGE_QUOTA: quota in bytes, `0` for unlimited (default: 5 MiB)
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("CLIPBOARD_STORAGE_PATH") {
            if !path.is_empty() {
                config.path = Some(PathBuf::from(path));
            }
        }

        if let Ok(raw) = std::env::var("CLIPBOARD_STORAGE_QUOTA") {
            match raw.trim().parse::<usize>() {
                Ok(0) => config.quota_bytes = None,
                Ok(n) => config.quota_bytes = Some(n),
                Err(e) => warn!(value = %raw, error = %e, "Ignoring invalid CLIPBOARD_STORAGE_QUOTA"),
            }
        }

        config
    }

    /// Set the quota
    #[must_use]
    pub fn with_quota(mut self, quota_bytes: Option<usize>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    /// Persist to the given file
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the event channel capacity (minimum 1)
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }
}
