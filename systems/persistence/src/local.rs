use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::PersistenceError;

/// Synchronous key/value storage for serialized snapshots.
pub trait KeyValueStore {
    /// Reads the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

/// Store keeping one `{key}.json` file per entry inside a directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    /// Opens the store rooted at `directory`, creating it when missing.
    pub fn open(directory: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let directory = directory.into();
        fs::create_dir_all(&directory).map_err(|source| PersistenceError::Io {
            key: directory.display().to_string(),
            source,
        })?;
        Ok(Self { directory })
    }

    /// Directory holding the entries.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::Io {
                key: key.to_owned(),
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");
        let io_error = |source| PersistenceError::Io {
            key: key.to_owned(),
            source,
        };

        fs::write(&staging, value).map_err(io_error)?;
        fs::rename(&staging, &path).map_err(io_error)
    }
}

/// In-process store used by tests and ephemeral sessions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Amount of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether nothing has been stored yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let _ = self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips_entries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = FileStore::open(dir.path().join("saves")).expect("open store");

        assert_eq!(store.get("number_rush_save").expect("read"), None);
        store.set("number_rush_save", "{\"level\":3}").expect("write");
        assert_eq!(
            store.get("number_rush_save").expect("read").as_deref(),
            Some("{\"level\":3}")
        );
    }

    #[test]
    fn file_store_leaves_no_staging_file_behind() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = FileStore::open(dir.path()).expect("open store");
        store.set("save_code_abc", "first").expect("write");
        store.set("save_code_abc", "second").expect("overwrite");

        let names: Vec<String> = fs::read_dir(store.directory())
            .expect("list")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["save_code_abc.json".to_owned()]);
        assert_eq!(
            store.get("save_code_abc").expect("read").as_deref(),
            Some("second")
        );
    }

    #[test]
    fn memory_store_overwrites_keys() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());
        store.set("k", "1").expect("write");
        store.set("k", "2").expect("write");
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("k").expect("read").as_deref(), Some("2"));
    }
}
