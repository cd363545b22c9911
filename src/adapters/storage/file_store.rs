use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use crate::ports::{KeyValueStore, StorageError, StorageResult};

/// Key-value storage kept as one JSON object in a file.
///
/// Every call reads the file afresh; nothing is cached between calls.
pub struct FileKeyValueStore {
    path: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage file under the platform data directory.
    pub fn in_data_dir() -> StorageResult<Self> {
        let data_dir = dirs::data_dir().ok_or_else(|| {
            StorageError::ReadError("Cannot determine data directory".to_string())
        })?;

        Ok(Self::new(data_dir.join("page-comments").join("storage.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> StorageResult<BTreeMap<String, String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(StorageError::ReadError(e.to_string())),
        };

        serde_json::from_str(&content).map_err(|e| StorageError::ReadError(e.to_string()))
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::WriteError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::WriteError(e.to_string()))?;

        // Write beside the target and rename so readers never see a partial file.
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content).map_err(|e| StorageError::WriteError(e.to_string()))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| StorageError::WriteError(e.to_string()))
    }

    fn entries_for_update(&self) -> BTreeMap<String, String> {
        self.read_entries().unwrap_or_else(|e| {
            tracing::warn!("Discarding unreadable storage file {}: {}", self.path.display(), e);
            BTreeMap::new()
        })
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries_for_update();
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.entries_for_update();
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}
