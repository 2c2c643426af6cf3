//! HTTP server for the stock chat relay.
//!
//! Provides:
//! - `POST /api/chat`: relay a message and its history to the model
//! - `POST /api/render`: structured and HTML rendering of assistant text
//! - `GET /health`: liveness probe
//! - everything else: the static UI directory

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;

use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::http::Method;
use axum::http::header::CONTENT_TYPE;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use crate::config::DEFAULT_PORT;

/// Router with the browser-facing layers applied.
///
/// CORS accepts any origin so a UI served from elsewhere can call the API;
/// preflight requests are answered by the layer.
pub fn build_app(state: Arc<AppState>, static_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    create_router(state, static_dir)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Bind `0.0.0.0:port` and serve until `shutdown_signal` completes.
///
/// # Errors
/// Returns an error if the port cannot be bound or the server fails.
pub async fn run_server_with_shutdown<F>(
    state: Arc<AppState>,
    port: u16,
    static_dir: &Path,
    shutdown_signal: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    serve(listener, state, static_dir, shutdown_signal).await
}

/// Serve on an already bound listener.
///
/// # Errors
/// Returns an error if the server fails.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    static_dir: &Path,
    shutdown_signal: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    if static_dir.is_dir() {
        tracing::info!("Serving UI from {}", static_dir.display());
    } else {
        tracing::warn!("UI directory {} not found; only the API is served", static_dir.display());
    }

    let app = build_app(state, static_dir);
    tracing::info!("Stock chat relay listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tokio::sync::oneshot;
    use tower::ServiceExt;

    use super::*;
    use crate::relay::testing::ScriptedProvider;

    fn state() -> Arc<AppState> {
        let provider = Arc::new(ScriptedProvider::replying("**Summary:**"));
        Arc::new(AppState::with_provider(provider, 5).unwrap())
    }

    #[tokio::test]
    async fn test_cors_preflight_is_answered() {
        let app = build_app(state(), Path::new("does-not-exist"));
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/chat")
            .header("origin", "http://localhost:5173")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_serve_answers_then_shuts_down() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            serve(listener, state(), Path::new("does-not-exist"), async move {
                let _ = stopped.await;
            })
            .await
            .map_err(|e| e.to_string())
        });

        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let body: serde_json::Value = client
            .get(format!("http://{addr}/health"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");

        stop.send(()).unwrap();
        assert!(server.await.unwrap().is_ok());
    }
}
