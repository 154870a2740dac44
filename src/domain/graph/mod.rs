//! Answer graph domain
//!
//! Types shared by the orchestration graph and its front ends: the request,
//! the per-execution state, the visited nodes and the returned outcome.

mod error;
mod node;
mod outcome;
mod state;
mod trace;

pub use error::GraphError;
pub use node::GraphNode;
pub use outcome::GraphOutcome;
pub use state::{AskRequest, ExecutionState};
pub use trace::{ExecutionTrace, TraceEntry};

use std::fmt::Debug;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

/// Runs one question through the answer graph
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AnswerGraph: Send + Sync + Debug {
    async fn ask(&self, request: AskRequest) -> Result<GraphOutcome, GraphError>;
}
