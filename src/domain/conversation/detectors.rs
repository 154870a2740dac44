//! Pure phrase-list predicates over user messages
//!
//! Matching is case-insensitive and ignores surrounding punctuation. The
//! phrase lists cover English and Vietnamese small talk.

use serde::{Deserialize, Serialize};

use super::ChatTurn;

const GREETING_PHRASES: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "hiya",
    "yo",
    "hi there",
    "hello there",
    "hey there",
    "greetings",
    "good morning",
    "good afternoon",
    "good evening",
    "thanks",
    "thank you",
    "thanks a lot",
    "thank you so much",
    "many thanks",
    "how are you",
    "how are you doing",
    "how is it going",
    "what's up",
    "whats up",
    "nice to meet you",
    "bye",
    "goodbye",
    "see you",
    "ok",
    "okay",
    "xin chào",
    "chào",
    "chào bạn",
    "chào bot",
    "cảm ơn",
    "cám ơn",
    "cảm ơn bạn",
    "cảm ơn nhiều",
    "bạn khỏe không",
    "tạm biệt",
];

const SALUTATIONS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "hiya",
    "greetings",
    "good morning",
    "good afternoon",
    "good evening",
    "thanks",
    "thank you",
    "xin chào",
    "chào",
    "cảm ơn",
    "cám ơn",
];

/// Tokens that turn a salutation-led message into a real question
const QUESTION_WORDS: &[&str] = &[
    "what", "how", "why", "when", "where", "which", "who", "explain", "can", "could", "is",
    "are", "does", "do", "gì", "sao", "nào", "không",
];

/// Words that continue a salutation into a request
const CONTINUATION_WORDS: &[&str] = &["and", "but", "also", "about", "for", "so", "on", "và", "nhưng"];

const FOLLOW_UP_PHRASES: &[&str] = &[
    "give me",
    "show me",
    "tell me more",
    "more about",
    "what about",
    "how about",
    "explain more",
    "more details",
    "an example",
    "cho tôi",
    "cho mình",
    "thêm",
    "nói rõ hơn",
    "ví dụ",
];

const GREETING_TOKEN_LIMIT: usize = 4;

fn normalize(message: &str) -> String {
    message
        .trim()
        .trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_token(token: &str) -> &str {
    token.trim_matches(|c: char| c.is_ascii_punctuation())
}

/// Text after a leading salutation, when the salutation is a whole word
fn after_salutation<'a>(normalized: &'a str, salutation: &str) -> Option<&'a str> {
    let rest = normalized.strip_prefix(salutation)?;
    let rest = rest.strip_prefix([',', '!', '.']).unwrap_or(rest);
    if rest.is_empty() {
        return Some(rest);
    }

    rest.starts_with(' ').then(|| rest.trim_start())
}

/// Whether the message is small talk that needs no retrieval
pub fn is_greeting(message: &str) -> bool {
    let normalized = normalize(message);
    if normalized.is_empty() {
        return false;
    }

    if GREETING_PHRASES.contains(&normalized.as_str()) {
        return true;
    }

    let tokens: Vec<&str> = normalized.split_whitespace().map(strip_token).collect();
    if tokens.len() > GREETING_TOKEN_LIMIT || message.contains('?') {
        return false;
    }

    let starts_with_salutation = SALUTATIONS.iter().any(|salutation| {
        after_salutation(&normalized, salutation).is_some_and(|rest| {
            !rest
                .split_whitespace()
                .next()
                .map(strip_token)
                .is_some_and(|word| CONTINUATION_WORDS.contains(&word))
        })
    });

    starts_with_salutation && !tokens.iter().any(|t| QUESTION_WORDS.contains(t))
}

/// Parameters of follow-up query rewriting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryEnhancementConfig {
    /// Questions with fewer tokens than this are treated as follow-ups
    pub short_question_tokens: usize,
    /// Characters of the previous answer carried into the rewritten query
    pub answer_prefix_chars: usize,
}

impl Default for QueryEnhancementConfig {
    fn default() -> Self {
        Self {
            short_question_tokens: 5,
            answer_prefix_chars: 200,
        }
    }
}

/// Whether the question leans on the previous turn for meaning
pub fn is_follow_up(question: &str, config: &QueryEnhancementConfig) -> bool {
    let normalized = normalize(question);
    normalized.split_whitespace().count() < config.short_question_tokens
        || FOLLOW_UP_PHRASES.iter().any(|p| normalized.contains(p))
}

/// Rewrite a follow-up question into a self-contained retrieval query
///
/// Returns `None` when there is no history or the question stands alone.
pub fn enhance_query(
    question: &str,
    history: &[ChatTurn],
    config: &QueryEnhancementConfig,
) -> Option<String> {
    let previous = history.last()?;
    if !is_follow_up(question, config) {
        return None;
    }

    let answer_prefix: String = previous
        .answer
        .chars()
        .take(config.answer_prefix_chars)
        .collect();

    Some(
        [previous.question.trim(), question.trim(), answer_prefix.trim()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" "),
    )
}
