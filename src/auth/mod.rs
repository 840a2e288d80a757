//! Per-model API key storage in the system keyring.
//!
//! Keys live under the `monero-tutor` service with the model id as the
//! account name. Lookups fall back to the environment variable named by the
//! catalog entry, so baseline models work without any keyring setup.

use crate::core::config::ModelConfig;
use crate::core::keyring::{
    key_or_missing, removed_secret, stored_secret, KeyringAccessError, KeyringOp,
};
use crate::core::resolver::CredentialSource;
use keyring::Entry;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

const KEYRING_SERVICE: &str = "monero-tutor";

#[derive(Clone, Debug)]
enum KeyringCacheEntry {
    Present(String),
    Missing,
}

pub struct AuthManager {
    use_keyring: bool,
    cache: Mutex<HashMap<String, KeyringCacheEntry>>,
}

impl Default for AuthManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthManager {
    pub fn new() -> Self {
        Self::new_with_keyring(true)
    }

    /// Construct an AuthManager, optionally disabling keyring access (useful for tests
    /// and `--ephemeral` runs).
    pub fn new_with_keyring(use_keyring: bool) -> Self {
        Self {
            use_keyring,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn uses_keyring(&self) -> bool {
        self.use_keyring
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<String, KeyringCacheEntry>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn entry(model_id: &str, op: KeyringOp) -> Result<Entry, KeyringAccessError> {
        Entry::new(KEYRING_SERVICE, model_id)
            .map_err(|err| KeyringAccessError::new(op, model_id, err))
    }

    pub fn store_token(&self, model_id: &str, token: &str) -> Result<(), KeyringAccessError> {
        if !self.use_keyring {
            return Ok(());
        }
        Self::entry(model_id, KeyringOp::Write)?
            .set_password(token)
            .map_err(|err| KeyringAccessError::new(KeyringOp::Write, model_id, err))?;
        self.cache().insert(
            model_id.to_string(),
            KeyringCacheEntry::Present(token.to_string()),
        );
        Ok(())
    }

    pub fn get_token(&self, model_id: &str) -> Result<Option<String>, KeyringAccessError> {
        if !self.use_keyring {
            return Ok(None);
        }
        if let Some(cached) = self.cache().get(model_id) {
            return Ok(match cached {
                KeyringCacheEntry::Present(token) => Some(token.clone()),
                KeyringCacheEntry::Missing => None,
            });
        }

        debug!(model_id, "keyring lookup");
        let entry = Self::entry(model_id, KeyringOp::Read)?;
        let result = stored_secret(model_id, entry.get_password())?;
        let cached = match &result {
            Some(token) => KeyringCacheEntry::Present(token.clone()),
            None => KeyringCacheEntry::Missing,
        };
        self.cache().insert(model_id.to_string(), cached);
        Ok(result)
    }

    /// Returns `true` if a stored key was deleted, `false` if there was none.
    pub fn remove_token(&self, model_id: &str) -> Result<bool, KeyringAccessError> {
        if !self.use_keyring {
            return Ok(false);
        }
        let entry = Self::entry(model_id, KeyringOp::Delete)?;
        let removed = removed_secret(model_id, entry.delete_credential())?;
        self.cache()
            .insert(model_id.to_string(), KeyringCacheEntry::Missing);
        Ok(removed)
    }

    /// Where a usable key for `model` would come from, if anywhere.
    pub fn credential_origin(&self, model: &ModelConfig) -> Option<CredentialOrigin> {
        if model.inline_api_key().is_some() {
            return Some(CredentialOrigin::Catalog);
        }
        if self.keyring_key(model).is_some() {
            return Some(CredentialOrigin::Keyring);
        }
        env_key(model).map(|_| CredentialOrigin::Environment)
    }

    fn keyring_key(&self, model: &ModelConfig) -> Option<String> {
        key_or_missing(self.get_token(&model.id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialOrigin {
    Catalog,
    Keyring,
    Environment,
}

impl CredentialOrigin {
    pub fn label(self) -> &'static str {
        match self {
            CredentialOrigin::Catalog => "catalog",
            CredentialOrigin::Keyring => "keyring",
            CredentialOrigin::Environment => "env",
        }
    }
}

fn env_key(model: &ModelConfig) -> Option<String> {
    let var = model.api_key_env.as_deref()?;
    std::env::var(var).ok().filter(|value| !value.trim().is_empty())
}

impl CredentialSource for AuthManager {
    fn api_key_for(&self, model: &ModelConfig) -> Option<String> {
        self.keyring_key(model).or_else(|| env_key(model))
    }
}
