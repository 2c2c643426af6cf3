//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::config::ChatConfig;
use crate::relay::{CompletionProvider, GeminiProvider, Relay};
use crate::render::MessageRenderer;

/// Shared application state.
pub struct AppState {
    /// Relay towards the language model.
    pub relay: Relay,
    /// Renderer backing `/api/render`.
    pub renderer: MessageRenderer,
}

impl AppState {
    /// Create the state with the Gemini provider described by `config`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client or the renderer cannot be built.
    pub fn new(config: &ChatConfig) -> Result<Arc<Self>, Box<dyn std::error::Error + Send + Sync>> {
        let provider = GeminiProvider::new(&config.relay)
            .map_err(|e| format!("Failed to create Gemini client: {e}"))?;

        if config.relay.api_key.is_none() {
            tracing::warn!("GOOGLE_AI_API_KEY is not set; /api/chat will answer with an error");
        }

        let state = Self::with_provider(Arc::new(provider), config.relay.history_window)?;
        Ok(Arc::new(state))
    }

    /// Create the state around an arbitrary provider.
    ///
    /// # Errors
    /// Returns an error if the renderer patterns fail to compile.
    pub fn with_provider(
        provider: Arc<dyn CompletionProvider>,
        history_window: usize,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            relay: Relay::new(provider, history_window),
            renderer: MessageRenderer::new()?,
        })
    }
}
