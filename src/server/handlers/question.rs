use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    #[serde(default)]
    pub question: Option<String>,
}

pub async fn process_question(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QuestionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let question = payload
        .ok()
        .and_then(|Json(body)| body.question)
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("No question provided"))?;

    let started = Instant::now();
    let handle = state.index.load().await?;
    let results = state
        .index
        .search(&handle, &question, state.config.retrieval.top_k)
        .await?;
    let context: Vec<String> = results.into_iter().map(|r| r.chunk.content).collect();

    let response = state.answers.answer(&question, &context).await?;

    tracing::info!(
        source = %handle.meta().source,
        context_chunks = context.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Question answered"
    );

    Ok(Json(json!({ "response": response })))
}
