//! Configuration for the relay server and the terminal client.
//!
//! Values come from environment variables, falling back to defaults, and are
//! checked by [`ChatConfig::validate`] before use.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::relay::prompt::DEFAULT_HISTORY_WINDOW;

/// Upstream generation endpoint used when none is configured.
pub const DEFAULT_MODEL_URL: &str =
    "https://generativelanguage.googleapis.com/v1/models/gemini-1.5-flash:generateContent";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Environment variable names.
pub mod env {
    /// Provider API key.
    pub const API_KEY: &str = "GOOGLE_AI_API_KEY";
    /// Server port.
    pub const PORT: &str = "STOCK_CHAT_PORT";
    /// Upstream endpoint.
    pub const MODEL_URL: &str = "STOCK_CHAT_MODEL_URL";
    /// History entries forwarded upstream.
    pub const HISTORY_WINDOW: &str = "STOCK_CHAT_HISTORY_WINDOW";
    /// Static UI directory.
    pub const STATIC_DIR: &str = "STOCK_CHAT_STATIC_DIR";
    /// Relay base URL used by the client.
    pub const RELAY_URL: &str = "STOCK_CHAT_RELAY_URL";
    /// Client data directory.
    pub const DATA_DIR: &str = "STOCK_CHAT_DATA_DIR";
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value is out of range or malformed.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// A URL could not be parsed.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

/// Convenience result alias for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Upstream relay settings.
    pub relay: RelayConfig,
    /// Terminal client settings.
    pub client: ClientConfig,
}

impl ChatConfig {
    /// Load from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variables. Unparseable values fall back
    /// to their defaults.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.relay.api_key = lookup(env::API_KEY).filter(|k| !k.trim().is_empty());
        if let Some(url) = lookup(env::MODEL_URL) {
            config.relay.endpoint = url;
        }
        if let Some(window) = lookup(env::HISTORY_WINDOW).and_then(|w| w.parse().ok()) {
            config.relay.history_window = window;
        }
        if let Some(port) = lookup(env::PORT).and_then(|p| p.parse().ok()) {
            config.server.port = port;
        }
        if let Some(dir) = lookup(env::STATIC_DIR) {
            config.server.static_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup(env::RELAY_URL) {
            config.client.relay_url = url;
        }
        if let Some(dir) = lookup(env::DATA_DIR) {
            config.client.data_dir = PathBuf::from(dir);
        }

        config
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.relay.history_window == 0 {
            return Err(ConfigError::Invalid(
                "relay.history_window must be > 0".to_string(),
            ));
        }

        if self.relay.max_output_tokens == 0 {
            return Err(ConfigError::Invalid(
                "relay.max_output_tokens must be > 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.relay.temperature) {
            return Err(ConfigError::Invalid(
                "relay.temperature must be within 0.0..=2.0".to_string(),
            ));
        }

        if self.relay.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "relay.request_timeout_secs must be > 0".to_string(),
            ));
        }

        Url::parse(&self.relay.endpoint)?;
        Url::parse(&self.client.relay_url)?;

        Ok(())
    }
}

/// HTTP server settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listening port.
    pub port: u16,
    /// Directory served for any path not handled by the API.
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            static_dir: PathBuf::from("static"),
        }
    }
}

/// Upstream relay settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Provider API key. Never serialized.
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,
    /// Generation endpoint.
    pub endpoint: String,
    /// History entries forwarded upstream.
    pub history_window: usize,
    /// Sampling temperature.
    pub temperature: f32,
    /// Output token budget.
    pub max_output_tokens: u32,
    /// Upstream request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_MODEL_URL.to_string(),
            history_window: DEFAULT_HISTORY_WINDOW,
            temperature: 0.7,
            max_output_tokens: 2048,
            request_timeout_secs: 60,
        }
    }
}

/// Terminal client settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the relay server.
    pub relay_url: String,
    /// Directory of the local conversation storage.
    pub data_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let data_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".stock_chat");
        Self {
            relay_url: format!("http://127.0.0.1:{DEFAULT_PORT}"),
            data_dir,
        }
    }
}
