//! Error types for the conversation persistence layer.

use thiserror::Error;

/// Errors raised by a persistence substrate.
///
/// These never reach callers of [`ConversationStore`](super::ConversationStore):
/// the store logs them and degrades to an empty read or a dropped write.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying file system failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The stored collection could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Key contains characters the substrate cannot map to an entry.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// Convenience result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
