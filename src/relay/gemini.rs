//! Gemini `generateContent` provider with Google Search grounding.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::config::RelayConfig;

use super::errors::{RelayError, RelayResult, UPSTREAM_FALLBACK_ERROR};
use super::prompt::{Turn, TurnRole};
use super::{CompletionProvider, RelayFuture};

/// Connection timeout towards the provider.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    tools: Vec<GeminiTool>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    role: TurnRole,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GeminiTool {
    google_search: GoogleSearch,
}

#[derive(Serialize)]
struct GoogleSearch {}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Async client for the Gemini generation endpoint.
pub struct GeminiProvider {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiProvider {
    /// Build a provider from the relay configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &RelayConfig) -> RelayResult<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    fn build_request<'a>(&self, transcript: &'a [Turn]) -> GeminiRequest<'a> {
        GeminiRequest {
            contents: transcript
                .iter()
                .map(|turn| GeminiContent {
                    role: turn.role,
                    parts: vec![GeminiPart { text: &turn.text }],
                })
                .collect(),
            tools: vec![GeminiTool {
                google_search: GoogleSearch {},
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }

    async fn post(&self, api_key: &str, transcript: &[Turn]) -> RelayResult<String> {
        let body = self.build_request(transcript);
        debug!("Sending {} turns to {}", transcript.len(), self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await?;
            let details = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
            error!("Gemini API error ({status}): {details}");
            return Err(upstream_error(status.as_u16(), details));
        }

        let data: GeminiResponse = response.json().await?;
        first_candidate_text(data).ok_or(RelayError::EmptyResponse)
    }
}

impl CompletionProvider for GeminiProvider {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn generate<'a>(&'a self, transcript: &'a [Turn]) -> RelayFuture<'a, RelayResult<String>> {
        Box::pin(async move {
            let api_key = self.api_key.as_deref().ok_or(RelayError::MissingApiKey)?;
            self.post(api_key, transcript).await
        })
    }
}

fn upstream_error(status: u16, details: Value) -> RelayError {
    let message = details
        .pointer("/error/message")
        .and_then(Value::as_str)
        .unwrap_or(UPSTREAM_FALLBACK_ERROR)
        .to_string();
    RelayError::Upstream {
        status,
        message,
        details,
    }
}

fn first_candidate_text(data: GeminiResponse) -> Option<String> {
    data.candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .next()?
        .text
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::relay::prompt::build_transcript;

    fn provider(api_key: Option<&str>) -> GeminiProvider {
        let config = RelayConfig {
            api_key: api_key.map(str::to_string),
            ..RelayConfig::default()
        };
        GeminiProvider::new(&config).unwrap()
    }

    #[test]
    fn test_request_shape() {
        let transcript = build_transcript("hi", &[], 5);
        let request = provider(Some("k")).build_request(&transcript);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"].as_array().unwrap().len(), 3);
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["contents"][2]["parts"][0]["text"], "hi");
        assert_eq!(json["tools"], json!([{ "google_search": {} }]));
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 2048);
        assert!((json["generationConfig"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_candidate_text_extraction() {
        let data: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "**Summary:**" }] } }]
        }))
        .unwrap();
        assert_eq!(first_candidate_text(data).as_deref(), Some("**Summary:**"));

        let empty: GeminiResponse = serde_json::from_value(json!({})).unwrap();
        assert!(first_candidate_text(empty).is_none());

        let blank: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "" }] } }]
        }))
        .unwrap();
        assert!(first_candidate_text(blank).is_none());
    }

    #[test]
    fn test_upstream_error_message() {
        let details = json!({ "error": { "message": "API key not valid", "code": 400 } });
        let err = upstream_error(400, details.clone());

        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "API key not valid");
        assert_eq!(err.to_body().details, Some(details));

        let fallback = upstream_error(503, Value::String("overloaded".into()));
        assert_eq!(fallback.to_string(), UPSTREAM_FALLBACK_ERROR);
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network() {
        let provider = provider(None);
        let transcript = build_transcript("hi", &[], 5);

        assert!(!provider.is_configured());
        let result = provider.generate(&transcript).await;
        assert!(matches!(result, Err(RelayError::MissingApiKey)));
    }
}
