use crate::core::storage::KeyValueStore;
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};

pub const SETTINGS_KEY: &str = "settings";
pub const MODELS_KEY: &str = "models";
pub const CHAT_HISTORY_KEY: &str = "chat_history";

/// Overrides the platform data directory.
pub const DATA_DIR_ENV: &str = "MONERO_TUTOR_DATA_DIR";

/// Errors raised while reading or writing a persisted record.
#[derive(Debug)]
pub enum StoreError {
    /// The backing store could not be read or written.
    Io {
        /// Record the operation targeted.
        key: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A value could not be encoded as JSON.
    Serialize {
        key: String,
        source: serde_json::Error,
    },

    /// The stored text is not valid JSON for the expected shape.
    Parse {
        key: String,
        source: serde_json::Error,
    },

    /// No data directory could be determined for this platform.
    NoDataDir,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io { key, source } => {
                write!(f, "Failed to access stored {key}: {source}")
            }
            StoreError::Serialize { key, source } => {
                write!(f, "Failed to encode {key}: {source}")
            }
            StoreError::Parse { key, source } => {
                write!(f, "Failed to parse stored {key}: {source}")
            }
            StoreError::NoDataDir => write!(
                f,
                "Could not determine a data directory; pass --data-dir or set {DATA_DIR_ENV}"
            ),
        }
    }
}

impl StdError for StoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            StoreError::Io { source, .. } => Some(source),
            StoreError::Serialize { source, .. } | StoreError::Parse { source, .. } => {
                Some(source)
            }
            StoreError::NoDataDir => None,
        }
    }
}

/// Reads and decodes one record. `Ok(None)` means nothing has been stored under `key`.
pub fn read_record<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Parse {
            key: key.to_string(),
            source,
        })
}

/// Encodes `value` and replaces the whole record under `key`.
pub fn write_record<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let encoded = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &encoded)
}

/// Resolves the directory holding the JSON records.
///
/// An explicit path wins, then [`DATA_DIR_ENV`], then the platform data directory.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf, StoreError> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    if let Some(path) = std::env::var_os(DATA_DIR_ENV).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    ProjectDirs::from("org", "monero-tutor", "monero-tutor")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or(StoreError::NoDataDir)
}

/// Get a user-friendly display string for a path, using `~` for the home directory on Unix.
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
