//! Answer generation contract

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::evidence::{build_context, extract_sources, EvidenceItem, Source};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Synthesizes an answer from a rendered context
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AnswerGenerator: Send + Sync + Debug {
    async fn generate(&self, question: &str, context: &str) -> Result<String, DomainError>;
}

/// Answer plus the sources it was generated from
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutput {
    pub answer: String,
    pub sources: Vec<Source>,
}

/// Render the evidence, generate, and attach ranked sources
pub async fn generate_answer(
    generator: &dyn AnswerGenerator,
    question: &str,
    evidence: &[EvidenceItem],
) -> Result<GenerationOutput, DomainError> {
    let context = build_context(evidence);
    let answer = generator.generate(question, &context).await?;

    Ok(GenerationOutput {
        answer,
        sources: extract_sources(evidence),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::evidence::keys;
    use mockall::predicate::eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_generate_answer_passes_rendered_context() {
        let evidence = vec![
            EvidenceItem::new("A primary key uniquely identifies a row.")
                .with_metadata(keys::COURSE_TITLE, json!("SQL Basics")),
        ];
        let mut generator = MockAnswerGenerator::new();
        generator
            .expect_generate()
            .with(
                eq("What is a primary key?"),
                eq("Course: SQL Basics\n\nA primary key uniquely identifies a row."),
            )
            .times(1)
            .returning(|_, _| Ok("It identifies rows.".to_string()));

        let output = generate_answer(&generator, "What is a primary key?", &evidence)
            .await
            .unwrap();

        assert_eq!(output.answer, "It identifies rows.");
        assert_eq!(output.sources.len(), 1);
        assert_eq!(output.sources[0].rank, 1);
    }

    #[tokio::test]
    async fn test_generation_error_propagates() {
        let mut generator = MockAnswerGenerator::new();
        generator
            .expect_generate()
            .returning(|_, _| Err(DomainError::provider("openai", "HTTP 500")));

        let result = generate_answer(&generator, "q", &[]).await;
        assert!(result.is_err());
    }
}
