use std::fmt;

use serde::{Deserialize, Serialize};

/// Nodes of the answer graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphNode {
    Route,
    Retrieve,
    GradeDocuments,
    Generate,
    WebSearch,
    Greeting,
    End,
}

impl GraphNode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Route => "route",
            Self::Retrieve => "retrieve",
            Self::GradeDocuments => "grade_documents",
            Self::Generate => "generate",
            Self::WebSearch => "websearch",
            Self::Greeting => "greeting",
            Self::End => "end",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::End)
    }
}

impl fmt::Display for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
