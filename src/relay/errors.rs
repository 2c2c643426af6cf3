//! Error types for the relay.

use serde_json::Value;
use thiserror::Error;

use super::types::ErrorBody;

/// Message returned for failures the caller cannot act on.
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred. Please try again.";

/// Message used when the provider rejects a request without explaining why.
pub const UPSTREAM_FALLBACK_ERROR: &str = "Failed to get response from AI service";

/// Errors produced while relaying a chat message.
#[derive(Debug, Error)]
pub enum RelayError {
    /// No provider API key was configured.
    #[error("API key not configured. Please add GOOGLE_AI_API_KEY to the environment")]
    MissingApiKey,
    /// The message was empty after trimming.
    #[error("Message cannot be empty")]
    EmptyMessage,
    /// The request body could not be decoded.
    #[error("invalid request body: {0}")]
    InvalidRequest(String),
    /// The provider answered with a non-success status.
    #[error("{message}")]
    Upstream {
        /// HTTP status returned by the provider.
        status: u16,
        /// Provider error message, or a generic one.
        message: String,
        /// Raw provider error body.
        details: Value,
    },
    /// The provider answered without any generated text.
    #[error("No response generated. Please try again.")]
    EmptyResponse,
    /// Transport failure talking to the provider.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Provider payload could not be decoded.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RelayError {
    /// HTTP status to answer the caller with.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::EmptyMessage => 400,
            Self::Upstream { status, .. } => *status,
            Self::MissingApiKey
            | Self::InvalidRequest(_)
            | Self::EmptyResponse
            | Self::Http(_)
            | Self::Json(_) => 500,
        }
    }

    /// Error body to answer the caller with.
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        match self {
            Self::MissingApiKey | Self::EmptyMessage | Self::EmptyResponse => ErrorBody {
                error: self.to_string(),
                details: None,
            },
            Self::Upstream {
                message, details, ..
            } => ErrorBody {
                error: message.clone(),
                details: Some(details.clone()),
            },
            Self::InvalidRequest(_) | Self::Http(_) | Self::Json(_) => ErrorBody {
                error: UNEXPECTED_ERROR.to_string(),
                details: Some(Value::String(self.to_string())),
            },
        }
    }
}

/// Convenience result alias for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;
