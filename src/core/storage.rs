//! Whole-record key-value persistence.
//!
//! Every record (settings, model catalog, chat history) is read and written as
//! one JSON document. [`FileStore`] keeps each record in `<dir>/<key>.json` and
//! replaces it atomically; [`MemoryStore`] backs tests and `--ephemeral` runs.

use crate::core::config::io::StoreError;
use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tempfile::NamedTempFile;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Removing a missing record succeeds.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn io_error(key: &str, source: std::io::Error) -> StoreError {
        StoreError::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.record_path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Self::io_error(key, err)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|err| Self::io_error(key, err))?;

        // Temp file in the same directory so the final rename stays on one filesystem.
        let mut temp_file =
            NamedTempFile::new_in(&self.dir).map_err(|err| Self::io_error(key, err))?;
        temp_file
            .write_all(value.as_bytes())
            .map_err(|err| Self::io_error(key, err))?;
        temp_file
            .as_file_mut()
            .sync_all()
            .map_err(|err| Self::io_error(key, err))?;
        temp_file
            .persist(self.record_path(key))
            .map_err(|err| Self::io_error(key, err.error))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.record_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Self::io_error(key, err)),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.records().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.records().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.records().remove(key);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Store whose writes always fail, for exercising the log-and-continue paths.
    pub struct ReadOnlyStore {
        pub inner: MemoryStore,
    }

    impl ReadOnlyStore {
        pub fn new() -> Self {
            Self {
                inner: MemoryStore::new(),
            }
        }
    }

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Io {
                key: key.to_string(),
                source: std::io::Error::new(ErrorKind::PermissionDenied, "read-only"),
            })
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            Err(StoreError::Io {
                key: key.to_string(),
                source: std::io::Error::new(ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }
}
