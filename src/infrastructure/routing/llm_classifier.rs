use async_trait::async_trait;

use crate::domain::llm::LlmJsonSchema;
use crate::domain::routing::{DataSource, QuestionClassifier, RouteQuery};
use crate::domain::DomainError;
use crate::infrastructure::llm::ModelGateway;

const ROUTER_SYSTEM_PROMPT: &str = r#"You are an expert router that decides whether a user's question should be answered using the internal vectorstore or web search.

The vectorstore contains educational content from an e-learning platform: course overviews and descriptions, lesson content (text, video transcripts, attachments) and audio transcripts from video lessons. Topics cover programming, databases, web development, software engineering and other technical subjects.

Route to "vectorstore" for:
- course content, lessons, transcripts or other educational material
- technical concepts, definitions and explanations
- how-to guidance, code examples, tutorials or walkthroughs that could be in course material
- any educational or technical content that might be covered in courses

Route to "web_search" only when:
- the user explicitly asks for current or time-sensitive information (news, latest releases, version numbers, CVEs, "today")
- the question is clearly outside course scope (general news, politics, sports, weather, real-time data)
- the user explicitly requests external sources or citations

When uncertain, choose "vectorstore"."#;

/// Routes questions with one structured model call
#[derive(Debug, Clone)]
pub struct LlmQuestionClassifier {
    gateway: ModelGateway,
}

impl LlmQuestionClassifier {
    pub fn new(gateway: ModelGateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl QuestionClassifier for LlmQuestionClassifier {
    async fn classify(&self, question: &str) -> Result<DataSource, DomainError> {
        let schema = LlmJsonSchema::strict("route_query", RouteQuery::json_schema());
        let route: RouteQuery = self
            .gateway
            .structured(ROUTER_SYSTEM_PROMPT, question, schema)
            .await?;

        Ok(route.datasource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::domain::llm::MockLlmProvider;
    use crate::infrastructure::llm::SlidingWindowLimiter;

    fn classifier(reply: &str) -> LlmQuestionClassifier {
        let provider = Arc::new(MockLlmProvider::new("mock").with_response(reply));
        LlmQuestionClassifier::new(ModelGateway::new(
            provider,
            Arc::new(SlidingWindowLimiter::disabled()),
            "gemini-2.5-flash",
        ))
    }

    #[tokio::test]
    async fn test_classifies_vectorstore() {
        let source = classifier(r#"{"datasource": "vectorstore"}"#)
            .classify("What is normalization?")
            .await
            .unwrap();
        assert_eq!(source, DataSource::Vectorstore);
    }

    #[tokio::test]
    async fn test_unknown_datasource_is_error() {
        let result = classifier(r#"{"datasource": "encyclopedia"}"#)
            .classify("Who won the match?")
            .await;
        assert!(matches!(result, Err(DomainError::InvalidModelOutput { .. })));
    }
}
