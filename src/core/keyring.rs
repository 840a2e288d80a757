//! Keyring outcomes for per-model API keys.
//!
//! A missing entry is an ordinary "no key", never an error. Real failures carry
//! the operation and model they hit. For credential lookups they are logged and
//! downgraded to "no key" by [`key_or_missing`], so a locked keychain never
//! blocks a model that also has an environment variable configured.

use std::error::Error;
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyringOp {
    Read,
    Write,
    Delete,
}

impl KeyringOp {
    fn verb(self) -> &'static str {
        match self {
            KeyringOp::Read => "read",
            KeyringOp::Write => "store",
            KeyringOp::Delete => "remove",
        }
    }
}

#[derive(Debug)]
pub enum KeyringAccessError {
    /// No usable secret backend, e.g. a locked keychain or no secret service on the bus.
    Unavailable {
        op: KeyringOp,
        model_id: String,
        source: keyring::Error,
    },
    /// The backend answered but refused the request.
    Rejected {
        op: KeyringOp,
        model_id: String,
        source: keyring::Error,
    },
}

impl KeyringAccessError {
    pub fn new(op: KeyringOp, model_id: &str, source: keyring::Error) -> Self {
        let model_id = model_id.to_string();
        match source {
            keyring::Error::PlatformFailure(_) | keyring::Error::NoStorageAccess(_) => {
                KeyringAccessError::Unavailable {
                    op,
                    model_id,
                    source,
                }
            }
            source => KeyringAccessError::Rejected {
                op,
                model_id,
                source,
            },
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, KeyringAccessError::Unavailable { .. })
    }

    pub fn op(&self) -> KeyringOp {
        match self {
            KeyringAccessError::Unavailable { op, .. } | KeyringAccessError::Rejected { op, .. } => {
                *op
            }
        }
    }

    pub fn model_id(&self) -> &str {
        match self {
            KeyringAccessError::Unavailable { model_id, .. }
            | KeyringAccessError::Rejected { model_id, .. } => model_id,
        }
    }
}

impl fmt::Display for KeyringAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = self.op().verb();
        match self {
            KeyringAccessError::Unavailable {
                model_id, source, ..
            } => write!(
                f,
                "Could not {verb} the API key for '{model_id}': system keyring unavailable ({source})"
            ),
            KeyringAccessError::Rejected {
                model_id, source, ..
            } => write!(f, "Could not {verb} the API key for '{model_id}': {source}"),
        }
    }
}

impl Error for KeyringAccessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            KeyringAccessError::Unavailable { source, .. }
            | KeyringAccessError::Rejected { source, .. } => Some(source),
        }
    }
}

/// Result of reading a secret. `NoEntry` means nothing is stored.
pub fn stored_secret(
    model_id: &str,
    result: Result<String, keyring::Error>,
) -> Result<Option<String>, KeyringAccessError> {
    match result {
        Ok(secret) => Ok(Some(secret)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(err) => Err(KeyringAccessError::new(KeyringOp::Read, model_id, err)),
    }
}

/// Result of deleting a secret: `true` when one was removed.
pub fn removed_secret(
    model_id: &str,
    result: Result<(), keyring::Error>,
) -> Result<bool, KeyringAccessError> {
    match result {
        Ok(()) => Ok(true),
        Err(keyring::Error::NoEntry) => Ok(false),
        Err(err) => Err(KeyringAccessError::new(KeyringOp::Delete, model_id, err)),
    }
}

/// Lookup policy for credentials: failures are logged and count as no key, as do blank secrets.
pub fn key_or_missing(lookup: Result<Option<String>, KeyringAccessError>) -> Option<String> {
    match lookup {
        Ok(secret) => secret.filter(|key| !key.trim().is_empty()),
        Err(err) => {
            warn!(
                model_id = err.model_id(),
                unavailable = err.is_unavailable(),
                error = %err,
                "keyring lookup failed; treating as no key"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locked() -> keyring::Error {
        keyring::Error::NoStorageAccess(Box::new(std::io::Error::other("locked")))
    }

    #[test]
    fn backend_outages_are_unavailable() {
        let err = KeyringAccessError::new(KeyringOp::Read, "m", locked());
        assert!(err.is_unavailable());
        assert_eq!(err.op(), KeyringOp::Read);
        assert!(err.to_string().contains("system keyring unavailable"));

        let err = KeyringAccessError::new(
            KeyringOp::Write,
            "m",
            keyring::Error::TooLong("user".into(), 255),
        );
        assert!(!err.is_unavailable());
        assert!(err.to_string().starts_with("Could not store the API key for 'm'"));
        assert!(err.source().is_some());
    }

    #[test]
    fn missing_entries_are_not_errors() {
        assert_eq!(
            stored_secret("m", Err(keyring::Error::NoEntry)).unwrap(),
            None
        );
        assert!(!removed_secret("m", Err(keyring::Error::NoEntry)).unwrap());
        assert!(removed_secret("m", Ok(())).unwrap());
        assert_eq!(
            stored_secret("m", Ok("sk".to_string())).unwrap().as_deref(),
            Some("sk")
        );
    }

    #[test]
    fn failed_reads_keep_the_operation() {
        let err = stored_secret("m", Err(locked())).unwrap_err();
        assert_eq!(err.op(), KeyringOp::Read);
        assert_eq!(err.model_id(), "m");

        let err = removed_secret("m", Err(locked())).unwrap_err();
        assert_eq!(err.op(), KeyringOp::Delete);
    }

    #[test]
    fn lookup_failures_and_blank_keys_count_as_missing() {
        assert_eq!(key_or_missing(stored_secret("m", Err(locked()))), None);
        assert_eq!(key_or_missing(Ok(Some("  ".to_string()))), None);
        assert_eq!(key_or_missing(Ok(None)), None);
        assert_eq!(
            key_or_missing(Ok(Some("sk-live".to_string()))).as_deref(),
            Some("sk-live")
        );
    }
}
