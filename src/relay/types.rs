//! Wire types of the relay endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::conversations::Message;

/// Body of `POST /api/chat`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The new user message.
    pub message: String,
    /// Prior messages of the conversation, oldest first.
    #[serde(default)]
    pub history: Vec<Message>,
}

/// Successful answer of `POST /api/chat`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated assistant text.
    pub response: String,
}

/// Failure answer of the relay endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error, shown to the user.
    pub error: String,
    /// Extra diagnostic payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}
