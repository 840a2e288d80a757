use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::ChatMessage;
use crate::core::config::io::{read_record, write_record, CHAT_HISTORY_KEY};
use crate::core::config::PreferenceStore;
use crate::core::constants::{WELCOME_MESSAGE, WELCOME_MESSAGE_ID};
use crate::core::message::{Message, Role};
use crate::core::storage::KeyValueStore;

/// Ordered message log for the active session.
///
/// Every append is followed by a whole-log persist, unless the user has
/// disabled chat logging. Storage failures are logged and never block the
/// in-memory log from changing.
pub struct ConversationStore {
    storage: Arc<dyn KeyValueStore>,
    prefs: Arc<PreferenceStore>,
    messages: Vec<Message>,
}

pub fn welcome_message() -> Message {
    Message::with_id(WELCOME_MESSAGE_ID, Role::Assistant, WELCOME_MESSAGE)
}

impl ConversationStore {
    pub fn new(storage: Arc<dyn KeyValueStore>, prefs: Arc<PreferenceStore>) -> Self {
        Self {
            storage,
            prefs,
            messages: Vec::new(),
        }
    }

    /// Reads persisted history without touching the in-memory log.
    pub fn persisted_history(&self) -> Vec<Message> {
        match read_record::<Vec<Message>>(self.storage.as_ref(), CHAT_HISTORY_KEY) {
            Ok(history) => history.unwrap_or_default(),
            Err(err) => {
                warn!(error = %err, "ignoring unreadable chat history");
                Vec::new()
            }
        }
    }

    /// Loads persisted history, or a lone welcome message when there is none.
    /// The welcome message is not written until the next append.
    pub fn load(&mut self) -> &[Message] {
        let history = self.persisted_history();
        self.messages = if history.is_empty() {
            vec![welcome_message()]
        } else {
            history
        };
        &self.messages
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Appends and persists. Returns `false` if a message with the same id is already present.
    pub fn append(&mut self, message: Message) -> bool {
        if self.messages.iter().any(|m| m.id() == message.id()) {
            warn!(id = %message.id(), "dropping message with duplicate id");
            return false;
        }
        self.messages.push(message);
        self.persist();
        true
    }

    pub fn persist(&self) {
        if self.prefs.get_settings().dont_log_chats {
            debug!("chat logging disabled; history not persisted");
            return;
        }
        if let Err(err) = write_record(self.storage.as_ref(), CHAT_HISTORY_KEY, &self.messages) {
            warn!(error = %err, "failed to save chat history");
        }
    }

    /// Removes persisted history. In-memory state is left alone; see [`Self::reset`].
    pub fn clear(&self) {
        if let Err(err) = self.storage.remove(CHAT_HISTORY_KEY) {
            warn!(error = %err, "failed to clear chat history");
        }
    }

    /// Replaces the in-memory log with a fresh welcome message, without persisting.
    pub fn reset(&mut self) {
        self.messages = vec![welcome_message()];
    }

    /// Role and content of every message, in order.
    pub fn api_history(&self) -> Vec<ChatMessage> {
        self.messages.iter().map(Message::to_api_message).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::test_support::ReadOnlyStore;
    use crate::core::storage::MemoryStore;

    fn store(dont_log_chats: bool) -> (Arc<MemoryStore>, ConversationStore) {
        let storage = Arc::new(MemoryStore::new());
        let prefs = Arc::new(PreferenceStore::new(storage.clone()));
        let mut settings = prefs.get_settings();
        settings.dont_log_chats = dont_log_chats;
        prefs.save_settings(&settings);
        (storage.clone(), ConversationStore::new(storage, prefs))
    }

    #[test]
    fn empty_history_loads_welcome_without_persisting() {
        let (storage, mut conversation) = store(false);
        let loaded = conversation.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id(), WELCOME_MESSAGE_ID);
        assert!(loaded[0].is_assistant());
        assert_eq!(storage.get(CHAT_HISTORY_KEY).unwrap(), None);
    }

    #[test]
    fn append_persists_full_log_with_timestamps() {
        let (storage, mut conversation) = store(false);
        conversation.load();
        let user = Message::user("What is RingCT?").unwrap();
        assert!(conversation.append(user.clone()));

        let stored: Vec<Message> = read_record(&*storage, CHAT_HISTORY_KEY)
            .unwrap()
            .expect("history persisted");
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].id(), WELCOME_MESSAGE_ID);
        assert_eq!(stored[1], user);

        let mut reloaded = ConversationStore::new(storage.clone(), conversation.prefs.clone());
        assert_eq!(reloaded.load(), stored.as_slice());
    }

    #[test]
    fn disabled_logging_leaves_storage_untouched() {
        let (storage, mut conversation) = store(true);
        storage.set(CHAT_HISTORY_KEY, "[]").unwrap();
        conversation.load();

        for text in ["one", "two", "three"] {
            conversation.append(Message::user(text).unwrap());
        }
        assert_eq!(conversation.len(), 4);
        assert_eq!(storage.get(CHAT_HISTORY_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let (_, mut conversation) = store(false);
        conversation.load();
        assert!(!conversation.append(welcome_message()));
        assert_eq!(conversation.len(), 1);
    }

    #[test]
    fn clear_removes_persisted_history_but_not_memory() {
        let (storage, mut conversation) = store(false);
        conversation.clear();

        conversation.load();
        conversation.append(Message::user("hi").unwrap());
        conversation.clear();
        assert_eq!(storage.get(CHAT_HISTORY_KEY).unwrap(), None);
        assert_eq!(conversation.len(), 2);

        conversation.reset();
        assert_eq!(conversation.len(), 1);
    }

    #[test]
    fn storage_failures_do_not_block_memory_updates() {
        let storage = Arc::new(ReadOnlyStore::new());
        let prefs = Arc::new(PreferenceStore::new(storage.clone()));
        let mut settings = prefs.get_settings();
        settings.dont_log_chats = false;
        prefs.save_settings(&settings);

        let mut conversation = ConversationStore::new(storage, prefs);
        conversation.load();
        assert!(conversation.append(Message::user("still here").unwrap()));
        conversation.clear();
        assert_eq!(conversation.len(), 2);
    }

    #[test]
    fn corrupt_history_loads_welcome() {
        let (storage, mut conversation) = store(false);
        storage.set(CHAT_HISTORY_KEY, "{oops").unwrap();
        let loaded = conversation.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id(), WELCOME_MESSAGE_ID);
    }
}
