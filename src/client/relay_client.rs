//! HTTP client for the relay's `/api/chat` endpoint.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::relay::{ChatRequest, ChatResponse, ErrorBody, RelayFuture};

use super::errors::{ClientError, ClientResult};

/// Error shown when the relay fails without an error body.
const FALLBACK_ERROR: &str = "Failed to get response";

/// Connection timeout towards the relay.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Sends chat requests to a relay.
pub trait ChatTransport: Send + Sync {
    /// Send `request` and return the generated assistant text.
    fn send<'a>(&'a self, request: &'a ChatRequest) -> RelayFuture<'a, ClientResult<String>>;
}

/// `reqwest` implementation of [`ChatTransport`].
pub struct RelayClient {
    client: Client,
    chat_url: Url,
}

impl RelayClient {
    /// Create a client for the relay at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the URL is malformed or the HTTP client cannot be built.
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let chat_url = Url::parse(base_url)?.join("/api/chat")?;
        // Overall request time is left to the relay's own upstream timeout.
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self { client, chat_url })
    }

    /// Endpoint the client posts to.
    #[must_use]
    pub const fn chat_url(&self) -> &Url {
        &self.chat_url
    }

    async fn post(&self, request: &ChatRequest) -> ClientResult<String> {
        debug!("POST {} ({} history entries)", self.chat_url, request.history.len());

        let response = self
            .client
            .post(self.chat_url.clone())
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let body: Value = response.json().await?;

        decode_reply(status.is_success(), body)
    }
}

impl ChatTransport for RelayClient {
    fn send<'a>(&'a self, request: &'a ChatRequest) -> RelayFuture<'a, ClientResult<String>> {
        Box::pin(self.post(request))
    }
}

fn decode_reply(success: bool, body: Value) -> ClientResult<String> {
    if !success {
        let message = serde_json::from_value::<ErrorBody>(body)
            .map_or_else(|_| FALLBACK_ERROR.to_string(), |b| b.error);
        return Err(ClientError::Relay(message));
    }

    let data: ChatResponse = serde_json::from_value(body)?;
    Ok(data.response)
}
