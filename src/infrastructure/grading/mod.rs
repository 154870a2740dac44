//! Evidence grader implementations

mod llm_grader;

pub use llm_grader::LlmEvidenceGrader;
