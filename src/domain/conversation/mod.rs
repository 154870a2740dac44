//! Conversation helpers: chat turns, greeting and follow-up detection

mod detectors;

pub use detectors::{enhance_query, is_follow_up, is_greeting, QueryEnhancementConfig};

use serde::{Deserialize, Serialize};

/// One completed question/answer exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub question: String,
    pub answer: String,
}

impl ChatTurn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}
