//! Graph error types

use thiserror::Error;

use super::node::GraphNode;
use crate::domain::DomainError;

/// Errors that abort an answer graph execution
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GraphError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Node '{node}' failed: {source}")]
    Stage {
        node: GraphNode,
        #[source]
        source: DomainError,
    },

    #[error("Step limit of {max_steps} exceeded")]
    StepLimit { max_steps: u32 },
}

impl GraphError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn stage(node: GraphNode, source: DomainError) -> Self {
        Self::Stage { node, source }
    }

    pub fn step_limit(max_steps: u32) -> Self {
        Self::StepLimit { max_steps }
    }

    /// Node the failure happened in, if any
    pub fn node(&self) -> Option<GraphNode> {
        match self {
            Self::Stage { node, .. } => Some(*node),
            _ => None,
        }
    }
}
