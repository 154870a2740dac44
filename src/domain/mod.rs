//! Domain layer - Core business logic and entities

pub mod conversation;
pub mod error;
pub mod evidence;
pub mod generation;
pub mod grading;
pub mod graph;
pub mod llm;
pub mod retrieval;
pub mod routing;
pub mod web_search;

pub use conversation::{ChatTurn, QueryEnhancementConfig};
pub use error::{with_timeout, DomainError};
pub use evidence::{EvidenceItem, Source};
pub use generation::{AnswerGenerator, GenerationOutput};
pub use grading::{BinaryScore, EvidenceGrader, RetryConfig};
pub use graph::{
    AnswerGraph, AskRequest, ExecutionState, ExecutionTrace, GraphError, GraphNode, GraphOutcome,
};
pub use llm::{
    FinishReason, LlmProvider, LlmRequest, LlmRequestBuilder, LlmResponse, Message, MessageRole,
    Usage,
};
pub use retrieval::{EmbeddingProvider, EnrollmentStore, VectorRetriever};
pub use routing::{DataSource, QuestionClassifier, QuestionRouter, RouteDecision, RouteQuery};
pub use web_search::{WebSearchProvider, WebSearchResult};
