use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Every failure the HTTP API can hit. Callers only ever see a bare 400.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("provider request failed: {0:#}")]
    Provider(anyhow::Error),
    #[error("provider returned malformed JSON: {0}")]
    MalformedOutput(#[from] serde_json::Error),
    #[error("invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        StatusCode::BAD_REQUEST.into_response()
    }
}
