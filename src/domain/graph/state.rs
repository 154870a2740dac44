use serde::{Deserialize, Serialize};

use super::error::GraphError;
use crate::domain::conversation::ChatTurn;
use crate::domain::evidence::{EvidenceItem, Source};
use crate::domain::routing::RouteDecision;

/// Input to one graph execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub chat_history: Vec<ChatTurn>,
}

impl AskRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            user_id: None,
            chat_history: Vec::new(),
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_chat_history(mut self, chat_history: Vec<ChatTurn>) -> Self {
        self.chat_history = chat_history;
        self
    }

    /// Trim the question and drop a blank user id
    pub fn normalized(self) -> Result<Self, GraphError> {
        let question = self.question.trim().to_string();
        if question.is_empty() {
            return Err(GraphError::invalid_input("Question cannot be empty"));
        }

        let user_id = self
            .user_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        Ok(Self {
            question,
            user_id,
            chat_history: self.chat_history,
        })
    }
}

/// Mutable record threaded through the graph nodes of one execution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionState {
    pub question: String,
    /// Retrieval query rewritten from chat history, when the question is a follow-up
    pub enhanced_query: Option<String>,
    pub evidence: Vec<EvidenceItem>,
    pub generation: Option<String>,
    pub use_web_search: bool,
    pub sources: Option<Vec<Source>>,
    pub user_id: Option<String>,
    pub chat_history: Vec<ChatTurn>,
    pub route: Option<RouteDecision>,
    pub generation_attempts: u32,
}

impl ExecutionState {
    pub fn from_request(request: AskRequest) -> Self {
        Self {
            question: request.question,
            user_id: request.user_id,
            chat_history: request.chat_history,
            ..Default::default()
        }
    }

    /// Query sent to the vector retriever
    pub fn retrieval_query(&self) -> &str {
        self.enhanced_query.as_deref().unwrap_or(&self.question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_trims_question() {
        let request = AskRequest::new("  What is SQL?  ").normalized().unwrap();
        assert_eq!(request.question, "What is SQL?");
    }

    #[test]
    fn test_blank_question_is_rejected() {
        let result = AskRequest::new(" \n\t ").normalized();
        assert!(matches!(result, Err(GraphError::InvalidInput(_))));
    }

    #[test]
    fn test_blank_user_id_is_treated_as_absent() {
        let request = AskRequest::new("q").with_user_id("   ").normalized().unwrap();
        assert_eq!(request.user_id, None);

        let request = AskRequest::new("q").with_user_id(" m-7 ").normalized().unwrap();
        assert_eq!(request.user_id.as_deref(), Some("m-7"));
    }

    #[test]
    fn test_retrieval_query_prefers_enhanced_query() {
        let mut state = ExecutionState::from_request(AskRequest::new("more"));
        assert_eq!(state.retrieval_query(), "more");

        state.enhanced_query = Some("What is SQL? more".to_string());
        assert_eq!(state.retrieval_query(), "What is SQL? more");
        assert_eq!(state.question, "more");
    }
}
