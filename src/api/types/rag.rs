//! Request and response bodies for the ask endpoint

use serde::{Deserialize, Serialize};

use crate::domain::{AskRequest, ChatTurn, GraphOutcome, RouteDecision, Source};

#[derive(Debug, Clone, Deserialize)]
pub struct AskQuestionRequest {
    pub question: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub chat_history: Option<Vec<ChatTurn>>,
}

impl From<AskQuestionRequest> for AskRequest {
    fn from(body: AskQuestionRequest) -> Self {
        let mut request = AskRequest::new(body.question)
            .with_chat_history(body.chat_history.unwrap_or_default());
        request.user_id = body.user_id;
        request
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AskQuestionResponse {
    pub answer: String,
    /// Rendered execution trace, one line per node event
    pub trace: String,
    pub sources: Vec<Source>,
    pub chat_history: Vec<ChatTurn>,
    pub route: RouteDecision,
    pub low_confidence: bool,
}

impl From<GraphOutcome> for AskQuestionResponse {
    fn from(outcome: GraphOutcome) -> Self {
        Self {
            answer: outcome.answer,
            trace: outcome.trace.render(),
            sources: outcome.sources,
            chat_history: outcome.chat_history,
            route: outcome.route,
            low_confidence: outcome.low_confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_defaults() {
        let body: AskQuestionRequest =
            serde_json::from_str(r#"{"question": "What is SQL?"}"#).unwrap();
        let request = AskRequest::from(body);

        assert_eq!(request.question, "What is SQL?");
        assert_eq!(request.user_id, None);
        assert!(request.chat_history.is_empty());
    }

    #[test]
    fn test_request_body_with_history() {
        let body: AskQuestionRequest = serde_json::from_str(
            r#"{
                "question": "Give me examples",
                "user_id": "m-1",
                "chat_history": [{"question": "What is SQL?", "answer": "A query language."}]
            }"#,
        )
        .unwrap();
        let request = AskRequest::from(body);

        assert_eq!(request.user_id.as_deref(), Some("m-1"));
        assert_eq!(
            request.chat_history,
            vec![ChatTurn::new("What is SQL?", "A query language.")]
        );
    }
}
