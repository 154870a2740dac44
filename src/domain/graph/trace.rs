use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::node::GraphNode;

/// One recorded decision or event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub node: GraphNode,
    pub message: String,
    /// Milliseconds since the execution started
    pub elapsed_ms: u64,
}

/// Ordered log of what an execution did, returned alongside its result
#[derive(Debug, Clone)]
pub struct ExecutionTrace {
    started: Instant,
    entries: Vec<TraceEntry>,
}

impl Default for ExecutionTrace {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionTrace {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, node: GraphNode, message: impl Into<String>) {
        self.entries.push(TraceEntry {
            node,
            message: message.into(),
            elapsed_ms: self.started.elapsed().as_millis() as u64,
        });
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    /// Nodes in visiting order, consecutive duplicates collapsed
    pub fn visited(&self) -> Vec<GraphNode> {
        let mut nodes: Vec<GraphNode> = self.entries.iter().map(|e| e.node).collect();
        nodes.dedup();
        nodes
    }

    /// Text rendering, one entry per line
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|e| {
                format!(
                    "[{:>6}ms] {}: {}",
                    e.elapsed_ms,
                    e.node.as_str().to_uppercase(),
                    e.message
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
