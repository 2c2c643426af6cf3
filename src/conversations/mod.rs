//! Conversation management module.
//!
//! Local, single-profile persistence of the whole conversation collection
//! under one key of a key-value substrate, plus the summary projection used by
//! conversation lists.

pub mod errors;
pub mod storage;
pub mod store;
pub mod types;

pub use errors::{StorageError, StorageResult};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{ConversationStore, STORAGE_KEY};
pub use types::{
    Conversation, ConversationSummary, Message, NEW_CONVERSATION_TITLE, Role, generate_title,
};
