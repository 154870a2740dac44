//! LLM-based binary graders
//!
//! Each grade is one structured model call returning `{"binary_score": bool}`.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::grading::{BinaryScore, EvidenceGrader};
use crate::domain::llm::LlmJsonSchema;
use crate::domain::DomainError;
use crate::infrastructure::llm::ModelGateway;

const RELEVANCE_SYSTEM_PROMPT: &str = "You are a grader assessing the relevance of a retrieved \
document to a user question. If the document contains keywords or semantic meaning related to \
the question, grade it as relevant. It does not need to be a stringent test; the goal is to \
filter out erroneous retrievals. Give a binary score true or false to indicate whether the \
document is relevant to the question.";

fn relevance_prompt(document: &str, question: &str) -> String {
    format!("Retrieved document:\n\n{document}\n\nUser question: {question}")
}

const HALLUCINATION_SYSTEM_PROMPT: &str = "You are a grader assessing whether an LLM generation \
is grounded in / supported by a set of retrieved facts. Give a binary score true or false. True \
means that the answer is grounded in / supported by the set of facts.";

fn hallucination_prompt(evidence: &str, generation: &str) -> String {
    format!("Set of facts:\n\n{evidence}\n\nLLM generation: {generation}")
}

const ANSWER_SYSTEM_PROMPT: &str = "You are a grader assessing whether an answer addresses or \
resolves a question. Give a binary score true or false. True means that the answer resolves the \
question.";

fn answer_prompt(question: &str, generation: &str) -> String {
    format!("User question:\n\n{question}\n\nLLM generation: {generation}")
}

/// Graders backed by the rate-limited model gateway
#[derive(Debug, Clone)]
pub struct LlmEvidenceGrader {
    gateway: ModelGateway,
}

impl LlmEvidenceGrader {
    pub fn new(gateway: ModelGateway) -> Self {
        Self { gateway }
    }

    async fn grade(&self, name: &str, system: &str, user: String) -> Result<bool, DomainError> {
        let schema = LlmJsonSchema::strict(name, BinaryScore::json_schema());
        let score: BinaryScore = self.gateway.structured(system, &user, schema).await?;

        debug!(grader = name, score = score.binary_score, "Grade received");
        Ok(score.binary_score)
    }
}

#[async_trait]
impl EvidenceGrader for LlmEvidenceGrader {
    async fn grade_relevance(&self, question: &str, document: &str) -> Result<bool, DomainError> {
        let user = relevance_prompt(document, question);
        self.grade("grade_documents", RELEVANCE_SYSTEM_PROMPT, user)
            .await
    }

    async fn grade_hallucination(
        &self,
        evidence: &str,
        generation: &str,
    ) -> Result<bool, DomainError> {
        let user = hallucination_prompt(evidence, generation);
        self.grade("grade_hallucinations", HALLUCINATION_SYSTEM_PROMPT, user)
            .await
    }

    async fn grade_answer(&self, question: &str, generation: &str) -> Result<bool, DomainError> {
        let user = answer_prompt(question, generation);
        self.grade("grade_answer", ANSWER_SYSTEM_PROMPT, user).await
    }
}
