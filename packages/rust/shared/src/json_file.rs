//! Whole-file JSON persistence used by the ledger and the content index.
//!
//! Every write replaces the file in full: the value is written to a hidden
//! sibling temp file, then renamed over the target.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{GazetteError, Result};

/// Read and parse `path`. Returns `Ok(None)` if the file does not exist.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(GazetteError::storage(path, format!("read failed: {e}"))),
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| GazetteError::storage(path, format!("invalid JSON: {e}")))
}

/// Read `path`, or persist `T::default()` there and return it if the file is absent.
pub fn read_json_or_bootstrap<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Serialize + Default,
{
    match read_json(path)? {
        Some(value) => Ok(value),
        None => {
            let value = T::default();
            write_json_atomic(path, &value)?;
            debug!(path = %path.display(), "bootstrapped empty store");
            Ok(value)
        }
    }
}

/// Serialize `value` (pretty-printed) and atomically replace `path` with it.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| GazetteError::storage(parent, format!("cannot create directory: {e}")))?;
    }

    let json = serde_json::to_string_pretty(value)
        .map_err(|e| GazetteError::storage(path, format!("serialization failed: {e}")))?;

    let temp = temp_path(path);
    std::fs::write(&temp, json)
        .map_err(|e| GazetteError::storage(&temp, format!("write failed: {e}")))?;
    std::fs::rename(&temp, path)
        .map_err(|e| GazetteError::storage(path, format!("rename failed: {e}")))?;

    debug!(path = %path.display(), "wrote JSON file");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "store".into());
    path.with_file_name(format!(".{name}.tmp"))
}
