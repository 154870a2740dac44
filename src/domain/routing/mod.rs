//! Question routing
//!
//! Routing first applies the local greeting detector, then asks a
//! [`QuestionClassifier`] to pick a datasource. Classifier failures never
//! abort a request: they fall back to retrieval.

use std::fmt::{self, Debug};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::conversation::is_greeting;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Datasource selected by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Vectorstore,
    WebSearch,
}

/// Structured classifier output: `{"datasource": "vectorstore"}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteQuery {
    pub datasource: DataSource,
}

impl RouteQuery {
    pub fn json_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "datasource": {
                    "type": "string",
                    "enum": ["vectorstore", "web_search"],
                    "description": "Route to the course vectorstore or to web search"
                }
            },
            "required": ["datasource"],
            "additionalProperties": false
        })
    }
}

/// Where a question enters the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteDecision {
    Greeting,
    Retrieve,
    WebSearch,
}

impl RouteDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::Retrieve => "retrieve",
            Self::WebSearch => "web_search",
        }
    }
}

impl fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DataSource> for RouteDecision {
    fn from(source: DataSource) -> Self {
        match source {
            DataSource::Vectorstore => Self::Retrieve,
            DataSource::WebSearch => Self::WebSearch,
        }
    }
}

/// Model-backed datasource classification
#[cfg_attr(test, automock)]
#[async_trait]
pub trait QuestionClassifier: Send + Sync + Debug {
    async fn classify(&self, question: &str) -> Result<DataSource, DomainError>;
}

/// Greeting detection in front of a datasource classifier
#[derive(Debug, Clone)]
pub struct QuestionRouter {
    classifier: Arc<dyn QuestionClassifier>,
}

impl QuestionRouter {
    pub fn new(classifier: Arc<dyn QuestionClassifier>) -> Self {
        Self { classifier }
    }

    pub async fn route(&self, question: &str) -> RouteDecision {
        if is_greeting(question) {
            info!(route = "greeting", "Routing question to greeting");
            return RouteDecision::Greeting;
        }

        let decision = match self.classifier.classify(question).await {
            Ok(source) => RouteDecision::from(source),
            Err(e) => {
                warn!(error = %e, "Router classification failed, defaulting to retrieval");
                RouteDecision::Retrieve
            }
        };

        info!(route = %decision, "Routing question");
        decision
    }
}
