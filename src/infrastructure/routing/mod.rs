//! Question classifier implementations

mod llm_classifier;

pub use llm_classifier::LlmQuestionClassifier;
