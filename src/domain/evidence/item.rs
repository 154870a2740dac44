use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata keys understood by the pipeline
pub mod keys {
    pub const DOCUMENT_ID: &str = "document_id";
    pub const DOC_TYPE: &str = "doc_type";
    pub const SOURCE: &str = "source";
    pub const COURSE_ID: &str = "course_id";
    pub const COURSE_TITLE: &str = "course_title";
    pub const CHAPTER_ID: &str = "chapter_id";
    pub const CHAPTER_TITLE: &str = "chapter_title";
    pub const LESSON_ID: &str = "lesson_id";
    pub const LESSON_TITLE: &str = "lesson_title";
    pub const REQUIRES_ENROLLMENT: &str = "requires_enrollment";
    pub const TAGS: &str = "tags";
    pub const LANGUAGE: &str = "language";
    pub const COURSE_SKILL_LEVEL: &str = "course_skill_level";
    pub const CHAPTER_SUMMARY: &str = "chapter_summary";
    pub const LAST_MODIFIED: &str = "last_modified";
    pub const DISTANCE: &str = "distance";
}

/// `doc_type` marker carried by web search evidence
pub const WEB_SEARCH_DOC_TYPE: &str = "web_search";

/// A retrieved or searched text unit with metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub content: String,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl EvidenceItem {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    /// Evidence item wrapping concatenated web search results
    pub fn web_search(content: impl Into<String>, provider: &str) -> Self {
        Self::new(content)
            .with_metadata(keys::DOC_TYPE, Value::from(WEB_SEARCH_DOC_TYPE))
            .with_metadata(keys::SOURCE, Value::from(provider))
            .with_metadata(keys::REQUIRES_ENROLLMENT, Value::Bool(false))
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_all_metadata(mut self, metadata: HashMap<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key).filter(|v| !v.is_null())
    }

    /// Non-empty string value for `key`; numeric ids are rendered as strings
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn requires_enrollment(&self) -> bool {
        match self.get(keys::REQUIRES_ENROLLMENT) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            Some(Value::Number(n)) => n.as_i64().is_some_and(|v| v != 0),
            _ => false,
        }
    }

    pub fn course_id(&self) -> Option<String> {
        self.get_str(keys::COURSE_ID)
    }

    pub fn doc_type(&self) -> Option<String> {
        self.get_str(keys::DOC_TYPE)
    }

    pub fn is_web_search(&self) -> bool {
        self.doc_type().as_deref() == Some(WEB_SEARCH_DOC_TYPE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_web_search_item_metadata() {
        let item = EvidenceItem::web_search("result text", "tavily");

        assert!(item.is_web_search());
        assert!(!item.requires_enrollment());
        assert_eq!(item.get_str(keys::SOURCE), Some("tavily".to_string()));
        assert!(item.course_id().is_none());
    }

    #[test]
    fn test_requires_enrollment_variants() {
        let flagged = EvidenceItem::new("x").with_metadata(keys::REQUIRES_ENROLLMENT, json!(true));
        let string_flag =
            EvidenceItem::new("x").with_metadata(keys::REQUIRES_ENROLLMENT, json!("True"));
        let null_flag = EvidenceItem::new("x").with_metadata(keys::REQUIRES_ENROLLMENT, Value::Null);

        assert!(flagged.requires_enrollment());
        assert!(string_flag.requires_enrollment());
        assert!(!null_flag.requires_enrollment());
        assert!(!EvidenceItem::new("x").requires_enrollment());
    }

    #[test]
    fn test_numeric_course_id_is_stringified() {
        let item = EvidenceItem::new("x").with_metadata(keys::COURSE_ID, json!(42));
        assert_eq!(item.course_id(), Some("42".to_string()));
    }
}
