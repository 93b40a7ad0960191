pub mod error;
pub mod handlers;

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::llm::{CompletionProvider, OpenAiProvider, initialize_client};

/// Shared by every request. The provider is built once at startup.
#[derive(Clone)]
pub struct AppState {
    provider: Arc<dyn CompletionProvider>,
    language: Arc<str>,
}

impl AppState {
    pub fn new(provider: Arc<dyn CompletionProvider>, language: impl Into<String>) -> Self {
        Self {
            provider,
            language: Arc::from(language.into()),
        }
    }
}

pub fn router(state: AppState, origin: &str) -> Result<Router> {
    let origin = HeaderValue::from_str(origin)
        .with_context(|| format!("Invalid CORS origin {origin:?}"))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(Router::new()
        .route("/api/questions", get(handlers::questions))
        .route("/api/verdict", post(handlers::verdict))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

pub async fn run(config: ServerConfig) -> Result<()> {
    let client = initialize_client(&config.api_key, config.api_base.as_deref());
    let provider = OpenAiProvider::new(client, config.model.clone());
    tracing::info!(model = provider.model(), language = %config.language, "provider ready");

    let state = AppState::new(Arc::new(provider), config.language.clone());
    let app = router(state, &config.origin)?;

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, origin = %config.origin, "careerquiz server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server terminated unexpectedly")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Prompt;
    use anyhow::bail;
    use async_trait::async_trait;

    const ORIGIN: &str = "http://localhost:5173";

    struct EchoProvider;

    #[async_trait]
    impl CompletionProvider for EchoProvider {
        async fn complete(&self, prompt: &Prompt) -> Result<String> {
            match prompt.format {
                crate::llm::OutputFormat::JsonObject => Ok(r#"{"questions": []}"#.to_string()),
                crate::llm::OutputFormat::Text if prompt.user.contains("boom") => {
                    bail!("provider exploded")
                }
                crate::llm::OutputFormat::Text => Ok("Вердикт".to_string()),
            }
        }
    }

    async fn spawn_server() -> String {
        let state = AppState::new(Arc::new(EchoProvider), "Ukrainian");
        let app = router(state, ORIGIN).unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn invalid_origin_is_rejected() {
        let state = AppState::new(Arc::new(EchoProvider), "Ukrainian");
        assert!(router(state, "bad\norigin").is_err());
    }

    #[tokio::test]
    async fn routes_answer_over_http() {
        let base = spawn_server().await;
        let client = reqwest::Client::new();

        let questions = client
            .get(format!("{base}/api/questions"))
            .header(header::ORIGIN, ORIGIN)
            .send()
            .await
            .unwrap();
        assert_eq!(questions.status(), reqwest::StatusCode::OK);
        assert_eq!(
            questions
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|value| value.to_str().ok()),
            Some(ORIGIN)
        );
        let body: serde_json::Value = questions.json().await.unwrap();
        assert_eq!(body, serde_json::json!({"questions": []}));

        let verdict = client
            .post(format!("{base}/api/verdict"))
            .json(&serde_json::json!({"answers": [{"question": "Q", "answer": "A"}]}))
            .send()
            .await
            .unwrap();
        assert_eq!(verdict.status(), reqwest::StatusCode::OK);
        let body: serde_json::Value = verdict.json().await.unwrap();
        assert_eq!(body, serde_json::json!({"verdict": "Вердикт"}));
    }

    #[tokio::test]
    async fn bad_requests_get_empty_400() {
        let base = spawn_server().await;
        let client = reqwest::Client::new();

        let malformed = client
            .post(format!("{base}/api/verdict"))
            .header(header::CONTENT_TYPE, "application/json")
            .body("{\"answers\": 42}")
            .send()
            .await
            .unwrap();
        assert_eq!(malformed.status(), reqwest::StatusCode::BAD_REQUEST);
        assert!(malformed.bytes().await.unwrap().is_empty());

        let failing = client
            .post(format!("{base}/api/verdict"))
            .json(&serde_json::json!({"answers": [{"question": "boom", "answer": "A"}]}))
            .send()
            .await
            .unwrap();
        assert_eq!(failing.status(), reqwest::StatusCode::BAD_REQUEST);
        assert!(failing.bytes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn foreign_origin_sees_only_configured_origin() {
        let base = spawn_server().await;
        let response = reqwest::Client::new()
            .get(format!("{base}/api/questions"))
            .header(header::ORIGIN, "https://evil.example")
            .send()
            .await
            .unwrap();

        let allowed = response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok());
        assert_eq!(allowed, Some(ORIGIN));
        assert_ne!(allowed, Some("https://evil.example"));
    }

    #[tokio::test]
    async fn preflight_allows_json_post() {
        let base = spawn_server().await;
        let response = reqwest::Client::new()
            .request(reqwest::Method::OPTIONS, format!("{base}/api/verdict"))
            .header(header::ORIGIN, ORIGIN)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .send()
            .await
            .unwrap();

        assert!(response.status().is_success());
        let headers = response.headers();
        let value = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_ascii_lowercase()
        };
        assert_eq!(value(header::ACCESS_CONTROL_ALLOW_ORIGIN), ORIGIN);
        assert!(value(header::ACCESS_CONTROL_ALLOW_METHODS).contains("post"));
        assert!(value(header::ACCESS_CONTROL_ALLOW_HEADERS).contains("content-type"));
    }
}
