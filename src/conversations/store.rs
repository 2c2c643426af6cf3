//! Conversation store over a key-value substrate.
//!
//! The whole collection lives under a single key and is rewritten wholesale on
//! every mutation. Reads never fail: decoding or substrate errors are logged and
//! yield an empty collection. Writes are attempted once; failures are logged and
//! dropped.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use super::errors::StorageResult;
use super::storage::Storage;
use super::types::{Conversation, ConversationSummary, Message};

/// Key under which the collection is stored.
pub const STORAGE_KEY: &str = "stock_chat_conversations";

/// Persistent store for the conversation collection.
///
/// A store without a substrate (see [`ConversationStore::unavailable`]) answers
/// every read with an empty result and ignores every write.
#[derive(Clone)]
pub struct ConversationStore {
    storage: Option<Arc<dyn Storage>>,
    key: String,
}

impl ConversationStore {
    /// Create a store over `storage` using [`STORAGE_KEY`].
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage: Some(storage),
            key: STORAGE_KEY.to_string(),
        }
    }

    /// Create a store with no substrate behind it.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            storage: None,
            key: STORAGE_KEY.to_string(),
        }
    }

    /// Use a different storage key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Whether a substrate is attached.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.storage.is_some()
    }

    /// All stored conversations, in storage order.
    #[must_use]
    pub fn list_all(&self) -> Vec<Conversation> {
        let Some(storage) = &self.storage else {
            return Vec::new();
        };

        match self.read_all(storage.as_ref()) {
            Ok(conversations) => conversations,
            Err(e) => {
                error!("Error reading conversations: {e}");
                Vec::new()
            }
        }
    }

    /// Summaries of all conversations, most recently updated first.
    ///
    /// Conversations with equal `updated_at` keep their storage order.
    #[must_use]
    pub fn list_summaries(&self) -> Vec<ConversationSummary> {
        let mut summaries: Vec<ConversationSummary> =
            self.list_all().iter().map(Conversation::summary).collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        summaries
    }

    /// Look up a conversation by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Conversation> {
        self.list_all().into_iter().find(|c| c.id == id)
    }

    /// Insert or replace a conversation.
    ///
    /// A replaced conversation gets `updated_at` set to now regardless of the
    /// value passed in; a new one is appended as given.
    pub fn save(&self, conversation: &Conversation) {
        let Some(storage) = &self.storage else {
            return;
        };

        let mut conversations = self.list_all();
        upsert(&mut conversations, conversation.clone(), Utc::now());

        match self.write_all(storage.as_ref(), &conversations) {
            Ok(()) => debug!("Saved conversation: {}", conversation.id),
            Err(e) => error!("Error saving conversation {}: {e}", conversation.id),
        }
    }

    /// Remove a conversation. Unknown ids are ignored.
    pub fn delete(&self, id: &str) {
        let Some(storage) = &self.storage else {
            return;
        };

        let mut conversations = self.list_all();
        conversations.retain(|c| c.id != id);

        match self.write_all(storage.as_ref(), &conversations) {
            Ok(()) => debug!("Deleted conversation: {id}"),
            Err(e) => error!("Error deleting conversation {id}: {e}"),
        }
    }

    /// Remove the whole collection.
    pub fn clear_all(&self) {
        let Some(storage) = &self.storage else {
            return;
        };

        if let Err(e) = storage.remove_item(&self.key) {
            error!("Error clearing conversations: {e}");
        }
    }

    /// Build a new, unsaved conversation.
    #[must_use]
    pub fn create_new(&self, first_message: Option<Message>) -> Conversation {
        Conversation::new(first_message)
    }

    fn read_all(&self, storage: &dyn Storage) -> StorageResult<Vec<Conversation>> {
        match storage.get_item(&self.key)? {
            None => Ok(Vec::new()),
            Some(raw) => Ok(serde_json::from_str(&raw)?),
        }
    }

    fn write_all(&self, storage: &dyn Storage, conversations: &[Conversation]) -> StorageResult<()> {
        let raw = serde_json::to_string(conversations)?;
        storage.set_item(&self.key, &raw)
    }
}

impl std::fmt::Debug for ConversationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationStore")
            .field("available", &self.is_available())
            .field("key", &self.key)
            .finish()
    }
}

fn upsert(conversations: &mut Vec<Conversation>, mut conversation: Conversation, now: DateTime<Utc>) {
    if let Some(existing) = conversations.iter_mut().find(|c| c.id == conversation.id) {
        if now < conversation.created_at {
            warn!("Clock is behind creation time of {}", conversation.id);
        }
        conversation.updated_at = now.max(conversation.created_at);
        *existing = conversation;
    } else {
        conversations.push(conversation);
    }
}
