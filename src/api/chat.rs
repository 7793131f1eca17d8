//! Chat endpoint: retrieval-augmented generation over stored facts

use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::{Deserialize, Serialize};

use super::ApiState;
use crate::prompt;

/// Chat request body
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// Successful chat response
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Structured error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ChatError = (StatusCode, Json<ErrorResponse>);

fn chat_error(status: StatusCode, error: impl Into<String>) -> ChatError {
    (status, Json(ErrorResponse { error: error.into() }))
}

/// Handle a chat turn
///
/// Strict sequence: snapshot facts, retrieve the most relevant one, compose
/// the prompt, call the generation service, then run the extraction chain.
/// Extraction never affects the reply.
async fn chat(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ChatError> {
    let Some(message) = request.message.filter(|m| !m.trim().is_empty()) else {
        return Err(chat_error(StatusCode::BAD_REQUEST, "No message provided"));
    };

    // Full snapshot; the store is append-only, so a concurrent insert only
    // means this request misses a fact added after it began.
    let facts = state
        .fact_repo
        .list(state.subject_id.as_deref())
        .map_err(|e| {
            tracing::error!(error = %e, "fact snapshot failed");
            chat_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("fact store unavailable: {e}"),
            )
        })?;
    let candidates: Vec<String> = facts.into_iter().map(|f| f.content).collect();

    let relevant = state.retriever.retrieve(&message, &candidates).await;
    if let Some(fact) = &relevant {
        tracing::debug!(fact, "injecting relevant fact");
    }

    let context = prompt::format_context(relevant.as_deref());
    let composed = prompt::compose(&message, &context);

    let reply = state.generator.generate(&composed).await.map_err(|e| {
        tracing::error!(error = %e, "generation failed");
        chat_error(StatusCode::BAD_GATEWAY, format!("generation failed: {e}"))
    })?;

    // Post-turn extraction: fire-and-forget from the client's perspective
    let _ = state
        .extractor
        .run(state.subject_id.as_deref(), &message, &reply)
        .await;

    Ok(Json(ChatResponse { response: reply }))
}

/// Build chat router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new().route("/chat", post(chat)).with_state(state)
}
