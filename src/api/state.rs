//! Application state for shared services

use std::sync::Arc;

use super::health::HealthProbe;
use crate::domain::AnswerGraph;

#[derive(Clone)]
pub struct AppState {
    pub graph: Arc<dyn AnswerGraph>,
    /// Dependencies checked by the readiness endpoint
    pub probes: Vec<Arc<dyn HealthProbe>>,
}

impl AppState {
    pub fn new(graph: Arc<dyn AnswerGraph>) -> Self {
        Self {
            graph,
            probes: Vec::new(),
        }
    }

    pub fn with_probe(mut self, probe: Arc<dyn HealthProbe>) -> Self {
        self.probes.push(probe);
        self
    }
}
