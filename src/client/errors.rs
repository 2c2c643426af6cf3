//! Error types for the chat client.

use thiserror::Error;

/// Errors surfaced to the person chatting.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Blank input is rejected before any network call.
    #[error("Message cannot be empty")]
    EmptyMessage,
    /// The relay answered with an error body.
    #[error("{0}")]
    Relay(String),
    /// Transport failure talking to the relay.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The relay answer could not be decoded.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    /// The relay base URL is malformed.
    #[error("Invalid relay URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Convenience result alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
