use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde_json::Value;

use super::AppState;
use super::error::ApiError;
use crate::llm::prompts::{questions_prompt, verdict_prompt};
use crate::quiz::{Verdict, VerdictRequest};

/// `GET /api/questions` — relays the provider's JSON unchanged.
pub async fn questions(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let prompt = questions_prompt(&state.language);
    let text = state
        .provider
        .complete(&prompt)
        .await
        .map_err(ApiError::Provider)?;

    let questions: Value = serde_json::from_str(&text)?;
    tracing::info!(bytes = text.len(), "relayed generated questions");
    Ok(Json(questions))
}

/// `POST /api/verdict` — wraps the provider's text as `{verdict}`.
pub async fn verdict(
    State(state): State<AppState>,
    payload: Result<Json<VerdictRequest>, JsonRejection>,
) -> Result<Json<Verdict>, ApiError> {
    let Json(request) = payload?;
    let prompt = verdict_prompt(&state.language, &request.answers).map_err(ApiError::Provider)?;
    let verdict = state
        .provider
        .complete(&prompt)
        .await
        .map_err(ApiError::Provider)?;

    tracing::info!(answers = request.answers.len(), "relayed verdict");
    Ok(Json(Verdict { verdict }))
}
