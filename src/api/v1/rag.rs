//! Ask endpoint handler

use axum::extract::State;
use tracing::{error, info};

use crate::api::middleware::truncate_for_log;
use crate::api::state::AppState;
use crate::api::types::{ApiError, AskQuestionRequest, AskQuestionResponse, Json};
use crate::domain::AskRequest;

/// POST /api/v1/rag/ask
pub async fn ask_question(
    State(state): State<AppState>,
    Json(body): Json<AskQuestionRequest>,
) -> Result<Json<AskQuestionResponse>, ApiError> {
    if body.question.trim().is_empty() {
        return Err(ApiError::bad_request("Question cannot be empty"));
    }

    info!(
        question = %truncate_for_log(body.question.trim(), 120),
        history = body.chat_history.as_ref().map_or(0, Vec::len),
        "Processing question"
    );

    let outcome = state
        .graph
        .ask(AskRequest::from(body))
        .await
        .map_err(|e| {
            error!(error = %e, "Question processing failed");
            ApiError::from(e)
        })?;

    info!(
        route = %outcome.route,
        sources = outcome.sources.len(),
        attempts = outcome.generation_attempts,
        low_confidence = outcome.low_confidence,
        "Question answered"
    );

    Ok(Json(AskQuestionResponse::from(outcome)))
}
