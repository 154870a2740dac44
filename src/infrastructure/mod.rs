//! Infrastructure layer - External service implementations

pub mod database;
pub mod embedding;
pub mod generation;
pub mod grading;
pub mod graph;
pub mod llm;
pub mod logging;
pub mod observability;
pub mod retrieval;
pub mod routing;
pub mod web_search;
