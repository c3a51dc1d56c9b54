//! Cache snapshot persistence
//!
//! Stores the whole cache as a single JSON document keyed by cache key.
//! Writes go to a temp file first and are renamed into place so a crash
//! mid-write never leaves a truncated snapshot behind.

use crate::core::cache::CacheEntry;
use crate::utils::error::{Result, WoundsightError};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Snapshot file reader/writer
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all persisted entries. A missing file is an empty cache, not an
    /// error; a corrupt file surfaces as a storage error so the caller can
    /// decide whether to start cold.
    pub async fn load(&self) -> Result<HashMap<String, CacheEntry>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => {
                return Err(WoundsightError::storage(format!(
                    "Failed to read cache snapshot {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        serde_json::from_slice(&bytes).map_err(|e| {
            WoundsightError::storage(format!(
                "Failed to parse cache snapshot {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Atomically replace the snapshot with the given entries
    pub async fn save(&self, entries: &HashMap<String, CacheEntry>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    WoundsightError::storage(format!(
                        "Failed to create snapshot directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let bytes = serde_json::to_vec(entries)?;
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, &bytes).await.map_err(|e| {
            WoundsightError::storage(format!(
                "Failed to write cache snapshot {}: {}",
                tmp_path.display(),
                e
            ))
        })?;
        fs::rename(&tmp_path, &self.path).await.map_err(|e| {
            WoundsightError::storage(format!(
                "Failed to replace cache snapshot {}: {}",
                self.path.display(),
                e
            ))
        })?;

        debug!(
            "Persisted {} cache entries to {}",
            entries.len(),
            self.path.display()
        );
        Ok(())
    }
}
