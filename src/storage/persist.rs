/*!
 * Store Persistence
 * JSON snapshot file: an object mapping each key to its encoded value
 */

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::types::{StorageError, StorageResult};

/// Load a snapshot; a missing file yields an empty map
///
/// Entries whose value is not valid JSON are dropped with a warning.
pub(super) fn load(path: &Path) -> StorageResult<BTreeMap<String, String>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "No snapshot yet, starting empty");
            return Ok(BTreeMap::new());
        }
        Err(e) => return Err(StorageError::Io(format!("{}: {}", path.display(), e))),
    };

    let mut snapshot: BTreeMap<String, String> = serde_json::from_slice(&bytes)
        .map_err(|e| StorageError::Deserialization(format!("{}: {}", path.display(), e)))?;

    snapshot.retain(|key, text| {
        let valid = serde_json::from_str::<serde_json::Value>(text).is_ok();
        if !valid {
            warn!(key = %key, path = %path.display(), "Dropping unparseable stored value");
        }
        valid
    });

    Ok(snapshot)
}

/// Replace the snapshot file atomically (temp file + rename)
pub(super) fn save(path: &Path, snapshot: &BTreeMap<String, String>) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| StorageError::Io(format!("{}: {}", parent.display(), e)))?;
        }
    }

    let bytes =
        serde_json::to_vec(snapshot).map_err(|e| StorageError::Serialization(e.to_string()))?;

    let tmp = temp_path(path);
    fs::write(&tmp, bytes).map_err(|e| StorageError::Io(format!("{}: {}", tmp.display(), e)))?;
    fs::rename(&tmp, path).map_err(|e| StorageError::Io(format!("{}: {}", path.display(), e)))?;

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
