use super::trace::ExecutionTrace;
use crate::domain::conversation::ChatTurn;
use crate::domain::evidence::Source;
use crate::domain::routing::RouteDecision;

/// Result of a completed graph execution
#[derive(Debug, Clone)]
pub struct GraphOutcome {
    pub answer: String,
    pub sources: Vec<Source>,
    /// Incoming history with this exchange appended
    pub chat_history: Vec<ChatTurn>,
    pub trace: ExecutionTrace,
    pub route: RouteDecision,
    pub generation_attempts: u32,
    /// Set when the generation cap was hit before both graders passed
    pub low_confidence: bool,
}
