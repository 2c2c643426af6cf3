//! Relay between the chat UI and the hosted language model.
//!
//! A chat request (`message` + `history`) is validated, wrapped into a
//! transcript that opens with the formatting preamble and keeps only the most
//! recent history entries, then forwarded to a [`CompletionProvider`].

pub mod errors;
pub mod gemini;
pub mod prompt;
pub mod types;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

pub use errors::{RelayError, RelayResult};
pub use gemini::GeminiProvider;
pub use prompt::{Turn, TurnRole, build_transcript};
pub use types::{ChatRequest, ChatResponse, ErrorBody};

/// Boxed future type for provider calls.
pub type RelayFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Upstream text generation.
pub trait CompletionProvider: Send + Sync {
    /// Whether the provider has the credentials it needs.
    fn is_configured(&self) -> bool;

    /// Generate the next model turn for `transcript`.
    fn generate<'a>(&'a self, transcript: &'a [Turn]) -> RelayFuture<'a, RelayResult<String>>;
}

/// Validates chat requests and forwards them to the provider.
#[derive(Clone)]
pub struct Relay {
    provider: Arc<dyn CompletionProvider>,
    history_window: usize,
}

impl Relay {
    /// Create a relay over `provider`.
    #[must_use]
    pub fn new(provider: Arc<dyn CompletionProvider>, history_window: usize) -> Self {
        Self {
            provider,
            history_window,
        }
    }

    /// Whether the provider has its credentials.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.provider.is_configured()
    }

    /// Answer a chat request.
    ///
    /// # Errors
    /// Fails when the provider is not configured, the message is blank, or the
    /// provider call fails.
    pub async fn respond(&self, request: &ChatRequest) -> RelayResult<ChatResponse> {
        if !self.provider.is_configured() {
            return Err(RelayError::MissingApiKey);
        }
        if request.message.trim().is_empty() {
            return Err(RelayError::EmptyMessage);
        }

        let transcript = build_transcript(&request.message, &request.history, self.history_window);
        debug!(
            "Relaying message with {} of {} history entries",
            transcript.len() - 3,
            request.history.len()
        );

        let response = self.provider.generate(&transcript).await?;
        Ok(ChatResponse { response })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted provider shared by relay and server tests.

    use std::sync::Mutex;

    use super::{CompletionProvider, RelayError, RelayFuture, RelayResult, Turn};

    /// Replies with a fixed outcome and records every transcript it receives.
    pub struct ScriptedProvider {
        pub configured: bool,
        pub reply: Result<String, (u16, String)>,
        pub seen: Mutex<Vec<Vec<Turn>>>,
    }

    impl ScriptedProvider {
        pub fn replying(text: &str) -> Self {
            Self {
                configured: true,
                reply: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(status: u16, message: &str) -> Self {
            Self {
                configured: true,
                reply: Err((status, message.to_string())),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn unconfigured() -> Self {
            Self {
                configured: false,
                ..Self::replying("")
            }
        }

        pub fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    impl CompletionProvider for ScriptedProvider {
        fn is_configured(&self) -> bool {
            self.configured
        }

        fn generate<'a>(&'a self, transcript: &'a [Turn]) -> RelayFuture<'a, RelayResult<String>> {
            Box::pin(async move {
                self.seen.lock().unwrap().push(transcript.to_vec());
                match &self.reply {
                    Ok(text) => Ok(text.clone()),
                    Err((status, message)) => Err(RelayError::Upstream {
                        status: *status,
                        message: message.clone(),
                        details: serde_json::json!({ "error": { "message": message } }),
                    }),
                }
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedProvider;
    use super::*;
    use crate::conversations::Message;

    fn request(message: &str, history: Vec<Message>) -> ChatRequest {
        ChatRequest {
            message: message.to_string(),
            history,
        }
    }

    #[tokio::test]
    async fn test_respond_forwards_transcript() {
        let provider = Arc::new(ScriptedProvider::replying("**Top Gainers:**"));
        let relay = Relay::new(provider.clone(), 5);

        let response = relay
            .respond(&request("Top gainers?", vec![Message::user("hi")]))
            .await
            .unwrap();

        assert_eq!(response.response, "**Top Gainers:**");
        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen[0].len(), 4);
        assert_eq!(seen[0][3].text, "Top gainers?");
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected_before_provider() {
        let provider = Arc::new(ScriptedProvider::replying("unused"));
        let relay = Relay::new(provider.clone(), 5);

        let result = relay.respond(&request("   \n", Vec::new())).await;

        assert!(matches!(result, Err(RelayError::EmptyMessage)));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_key_checked_first() {
        let relay = Relay::new(Arc::new(ScriptedProvider::unconfigured()), 5);

        let result = relay.respond(&request("", Vec::new())).await;

        assert!(matches!(result, Err(RelayError::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates() {
        let relay = Relay::new(Arc::new(ScriptedProvider::failing(429, "quota")), 5);

        let err = relay.respond(&request("hi", Vec::new())).await.unwrap_err();

        assert_eq!(err.status_code(), 429);
        assert_eq!(err.to_body().error, "quota");
    }
}
