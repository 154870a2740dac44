//! Versioned question answering API

pub mod rag;

use axum::{routing::post, Router};

use super::state::AppState;

pub fn create_v1_router() -> Router<AppState> {
    Router::new().route("/rag/ask", post(rag::ask_question))
}
