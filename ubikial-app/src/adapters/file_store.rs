//! JSON-file-backed key/value store.
//!
//! The whole store is one JSON object (`{ "<key>": "<value>" }`) kept in
//! memory. Writes are buffered until [`flush`](KeyValueStore::flush), which
//! replaces the file atomically (write to a sibling temp file, then rename).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use ubikial_core::error::{CoreError, CoreResult};
use ubikial_core::traits::KeyValueStore;

struct State {
    entries: BTreeMap<String, String>,
    /// Bumped on every change
    revision: u64,
    /// Revision last written to disk
    flushed: u64,
}

/// Key/value store persisted to a single JSON file.
pub struct FileKeyValueStore {
    path: PathBuf,
    state: RwLock<State>,
    /// Serializes flushes so two writers never race on the temp file.
    flush_lock: Mutex<()>,
}

impl FileKeyValueStore {
    /// Open the store at `path`, loading existing entries.
    ///
    /// The file and its directory are created on first flush.
    ///
    /// # Errors
    /// Returns `CoreError::StorageError` if the file exists but cannot be
    /// read or is not a JSON object of strings.
    pub async fn open(path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                CoreError::StorageError(format!("Corrupted store file {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(CoreError::StorageError(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };
        log::debug!(
            "Opened file store {} ({} keys)",
            path.display(),
            entries.len()
        );

        Ok(Self {
            path,
            state: RwLock::new(State {
                entries,
                revision: 0,
                flushed: 0,
            }),
            flush_lock: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write_file(&self, contents: String) -> CoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CoreError::StorageError(format!("Failed to create directory: {e}")))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, contents)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            CoreError::StorageError(format!("Failed to replace {}: {e}", self.path.display()))
        })
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.state.read().await.entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> CoreResult<()> {
        let mut state = self.state.write().await;
        state.entries.insert(key.to_string(), value);
        state.revision += 1;
        Ok(())
    }

    async fn remove(&self, key: &str) -> CoreResult<()> {
        let mut state = self.state.write().await;
        if state.entries.remove(key).is_some() {
            state.revision += 1;
        }
        Ok(())
    }

    async fn flush(&self) -> CoreResult<()> {
        let _guard = self.flush_lock.lock().await;
        let (revision, contents) = {
            let state = self.state.read().await;
            if state.revision == state.flushed {
                return Ok(());
            }
            let contents = serde_json::to_string_pretty(&state.entries)
                .map_err(|e| CoreError::SerializationError(e.to_string()))?;
            (state.revision, contents)
        };

        self.write_file(contents).await?;
        self.state.write().await.flushed = revision;
        log::debug!("Flushed file store {}", self.path.display());
        Ok(())
    }
}
