//! Shared handles opened once per invocation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::auth::AuthManager;
use crate::core::completion::HttpCompletionClient;
use crate::core::config::io::{path_display, resolve_data_dir};
use crate::core::config::{PreferenceStore, StoreError};
use crate::core::conversation::ConversationStore;
use crate::core::session::ChatSession;
use crate::core::storage::{FileStore, KeyValueStore, MemoryStore};

pub struct AppContext {
    storage: Arc<dyn KeyValueStore>,
    prefs: Arc<PreferenceStore>,
    auth: Arc<AuthManager>,
    data_dir: Option<PathBuf>,
}

impl AppContext {
    /// Opens the file-backed store, or an in-memory one with the keyring disabled
    /// when `ephemeral` is set.
    pub fn open(data_dir: Option<PathBuf>, ephemeral: bool) -> Result<Self, StoreError> {
        if ephemeral {
            debug!("using in-memory storage");
            return Ok(Self::with_storage(
                Arc::new(MemoryStore::new()),
                AuthManager::new_with_keyring(false),
                None,
            ));
        }

        let dir = resolve_data_dir(data_dir)?;
        debug!(data_dir = %path_display(&dir), "using file storage");
        Ok(Self::with_storage(
            Arc::new(FileStore::new(dir.clone())),
            AuthManager::new(),
            Some(dir),
        ))
    }

    pub fn with_storage(
        storage: Arc<dyn KeyValueStore>,
        auth: AuthManager,
        data_dir: Option<PathBuf>,
    ) -> Self {
        let prefs = Arc::new(PreferenceStore::new(Arc::clone(&storage)));
        Self {
            storage,
            prefs,
            auth: Arc::new(auth),
            data_dir,
        }
    }

    pub fn prefs(&self) -> &PreferenceStore {
        &self.prefs
    }

    pub fn auth(&self) -> &AuthManager {
        &self.auth
    }

    /// `None` for ephemeral runs.
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// A conversation store that has not been loaded yet.
    pub fn conversation(&self) -> ConversationStore {
        ConversationStore::new(Arc::clone(&self.storage), Arc::clone(&self.prefs))
    }

    /// A chat session over the loaded history, talking HTTP.
    pub fn session(&self) -> ChatSession {
        let mut conversation = self.conversation();
        conversation.load();
        ChatSession::new(
            conversation,
            Arc::clone(&self.prefs),
            self.auth.clone(),
            Arc::new(HttpCompletionClient::default()),
        )
    }
}
