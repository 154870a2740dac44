//! Evidence and answer grading
//!
//! Graders make one binary decision per call. They propagate failures; the
//! caller decides whether to retry via [`retry_with_backoff`].

mod retry;

pub use retry::{retry_with_backoff, RetryConfig};

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Structured grader output: `{"binary_score": true}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryScore {
    pub binary_score: bool,
}

impl BinaryScore {
    pub fn json_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "binary_score": {
                    "type": "boolean",
                    "description": "true when the criterion is met, false otherwise"
                }
            },
            "required": ["binary_score"],
            "additionalProperties": false
        })
    }
}

/// Binary graders used by the answer pipeline
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EvidenceGrader: Send + Sync + Debug {
    /// Whether `document` is relevant to `question`
    async fn grade_relevance(&self, question: &str, document: &str) -> Result<bool, DomainError>;

    /// Whether `generation` is grounded in `evidence`
    async fn grade_hallucination(
        &self,
        evidence: &str,
        generation: &str,
    ) -> Result<bool, DomainError>;

    /// Whether `generation` addresses `question`
    async fn grade_answer(&self, question: &str, generation: &str) -> Result<bool, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_score_rejects_non_boolean() {
        assert!(serde_json::from_str::<BinaryScore>(r#"{"binary_score": "yes"}"#).is_err());
        assert!(serde_json::from_str::<BinaryScore>(r#"{"score": true}"#).is_err());
        assert_eq!(
            serde_json::from_str::<BinaryScore>(r#"{"binary_score": false}"#).unwrap(),
            BinaryScore { binary_score: false }
        );
    }
}
