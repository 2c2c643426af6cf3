//! HTTP route handlers for the stock chat relay.

use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;
use tracing::error;

use crate::relay::{ChatRequest, ChatResponse, RelayError};
use crate::render::Block;
use crate::render::html::blocks_to_html;

use super::error::ApiError;
use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>, static_dir: &Path) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/chat", post(chat_completion))
        .route("/api/render", post(render_message))
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "stock-chat",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Handle chat relay requests.
async fn chat_completion(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    if !state.relay.is_configured() {
        return Err(RelayError::MissingApiKey.into());
    }

    let Json(request) = payload.map_err(|e| RelayError::InvalidRequest(e.body_text()))?;

    let response = state.relay.respond(&request).await.map_err(|e| {
        error!("Chat API error: {e}");
        ApiError(e)
    })?;

    Ok(Json(response))
}

/// Render request.
#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    /// Assistant text to render.
    pub text: String,
}

/// Render response.
#[derive(Debug, Serialize)]
pub struct RenderResponse {
    /// Structured blocks.
    pub blocks: Vec<Block>,
    /// Escaped HTML presentation of the blocks.
    pub html: String,
}

/// Handle render requests.
async fn render_message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RenderRequest>,
) -> Json<RenderResponse> {
    let blocks = state.renderer.render(&request.text);
    let html = blocks_to_html(&blocks);
    Json(RenderResponse { blocks, html })
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::relay::testing::ScriptedProvider;

    fn app(provider: ScriptedProvider) -> (Arc<ScriptedProvider>, Router) {
        let provider = Arc::new(provider);
        let state = AppState::with_provider(provider.clone(), 5).unwrap();
        let router = create_router(Arc::new(state), Path::new("does-not-exist"));
        (provider, router)
    }

    async fn post_json(router: Router, uri: &str, body: String) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_chat_success() {
        let (provider, router) = app(ScriptedProvider::replying("**Top Gainers:**\n- TCS"));
        let body = json!({
            "message": "Top gainers today?",
            "history": [
                { "id": "1", "role": "user", "content": "hi", "timestamp": "2024-05-01T10:00:00.000Z" },
                { "id": "2", "role": "assistant", "content": "hello" }
            ]
        });

        let (status, json) = post_json(router, "/api/chat", body.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({ "response": "**Top Gainers:**\n- TCS" }));
        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen[0].len(), 5);
    }

    #[tokio::test]
    async fn test_chat_empty_message_is_bad_request() {
        let (provider, router) = app(ScriptedProvider::replying("unused"));

        let (status, json) =
            post_json(router, "/api/chat", json!({ "message": "  ", "history": [] }).to_string())
                .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Message cannot be empty");
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_chat_without_api_key() {
        let (_, router) = app(ScriptedProvider::unconfigured());

        let (status, json) =
            post_json(router, "/api/chat", json!({ "message": "hi" }).to_string()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"].as_str().unwrap().contains("API key not configured"));
    }

    #[tokio::test]
    async fn test_chat_upstream_status_is_forwarded() {
        let (_, router) = app(ScriptedProvider::failing(429, "Resource exhausted"));

        let (status, json) =
            post_json(router, "/api/chat", json!({ "message": "hi" }).to_string()).await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(json["error"], "Resource exhausted");
        assert!(json.get("details").is_some());
    }

    #[tokio::test]
    async fn test_chat_malformed_body() {
        let (_, router) = app(ScriptedProvider::replying("unused"));

        let (status, json) = post_json(router, "/api/chat", "{oops".to_string()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], crate::relay::errors::UNEXPECTED_ERROR);
        assert!(json["details"].is_string());
    }

    #[tokio::test]
    async fn test_render_endpoint() {
        let (_, router) = app(ScriptedProvider::replying("unused"));

        let (status, json) = post_json(
            router,
            "/api/render",
            json!({ "text": "**Key Insights:**\n<b>x</b>" }).to_string(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["blocks"][0]["type"], "header");
        assert_eq!(json["blocks"][0]["text"][0], json!({ "style": "text", "text": "Key Insights" }));
        assert_eq!(json["html"], "<h3>Key Insights</h3><p>&lt;b&gt;x&lt;/b&gt;</p>");
    }

    #[tokio::test]
    async fn test_static_fallback_serves_ui_shell() {
        let static_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("static");
        let state = AppState::with_provider(Arc::new(ScriptedProvider::replying("unused")), 5).unwrap();
        let router = create_router(Arc::new(state), &static_dir);
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();

        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("stock_chat_conversations"));
        assert!(html.contains("/api/chat"));
    }

    #[tokio::test]
    async fn test_unknown_path_without_ui_is_not_found() {
        let (_, router) = app(ScriptedProvider::replying("unused"));
        let request = Request::builder().uri("/missing.html").body(Body::empty()).unwrap();

        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health() {
        let (_, router) = app(ScriptedProvider::replying("unused"));
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
