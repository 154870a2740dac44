use async_trait::async_trait;

use crate::domain::generation::AnswerGenerator;
use crate::domain::DomainError;
use crate::infrastructure::llm::ModelGateway;

const GENERATION_SYSTEM_PROMPT: &str = "You are an assistant for question-answering tasks on an \
e-learning platform. Use the following pieces of retrieved context to answer the question. If \
you don't know the answer, just say that you don't know. Keep the answer concise and answer in \
the language of the question.";

fn generation_prompt(question: &str, context: &str) -> String {
    format!("Question: {question}\n\nContext:\n{context}\n\nAnswer:")
}

/// Plain-text answer synthesis through the model gateway
#[derive(Debug, Clone)]
pub struct LlmAnswerGenerator {
    gateway: ModelGateway,
}

impl LlmAnswerGenerator {
    pub fn new(gateway: ModelGateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl AnswerGenerator for LlmAnswerGenerator {
    async fn generate(&self, question: &str, context: &str) -> Result<String, DomainError> {
        let user = generation_prompt(question, context);

        self.gateway.complete(GENERATION_SYSTEM_PROMPT, &user).await
    }
}
