use super::*;

use std::collections::BTreeMap;
use std::fs;

use puzzleboard_core::{KeyValueStore, StoreError};

/// Best times and preview counters kept as one flat JSON object on disk.
///
/// Every write rewrites the whole file.
#[derive(Debug)]
pub(super) struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// A missing file is an empty store; an unreadable one is logged and
    /// treated as empty.
    pub(super) fn open(path: PathBuf) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), %err, "ignoring malformed store file");
                BTreeMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "store file unreadable");
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    pub(super) fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, key: &str) -> Result<(), StoreError> {
        let write_err = |reason: String| StoreError::Write {
            key: key.to_string(),
            reason,
        };
        let body = serde_json::to_string_pretty(&self.entries).map_err(|err| write_err(err.to_string()))?;
        fs::write(&self.path, body).map_err(|err| write_err(err.to_string()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Err(err) = self.flush(key) {
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("puzzleboard-store-{tag}-{}.json", std::process::id()))
    }

    #[test]
    fn values_survive_reopen() {
        let path = temp_path("reopen");
        let _ = fs::remove_file(&path);
        let mut store = FileStore::open(path.clone());
        store.set("best:p:easy", "41000").expect("write store");
        let reopened = FileStore::open(path.clone());
        assert_eq!(reopened.get("best:p:easy").as_deref(), Some("41000"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn malformed_file_reads_as_empty() {
        let path = temp_path("malformed");
        fs::write(&path, "{not json").expect("seed file");
        let store = FileStore::open(path.clone());
        assert_eq!(store.get("best:p:easy"), None);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn failed_write_keeps_previous_value() {
        let dir = std::env::temp_dir().join(format!("puzzleboard-store-dir-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("temp dir");
        // the path is a directory, so every flush fails
        let mut store = FileStore::open(dir.clone());
        assert!(store.set("best:p:easy", "1").is_err());
        assert_eq!(store.get("best:p:easy"), None);
        let _ = fs::remove_dir_all(dir);
    }
}
