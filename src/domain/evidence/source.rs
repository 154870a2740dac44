use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::item::{keys, EvidenceItem};

/// Metadata keys projected into a [`Source`]
pub const SOURCE_KEYS: &[&str] = &[
    keys::DOCUMENT_ID,
    keys::DOC_TYPE,
    keys::COURSE_ID,
    keys::COURSE_TITLE,
    keys::CHAPTER_ID,
    keys::CHAPTER_TITLE,
    keys::LESSON_ID,
    keys::LESSON_TITLE,
    keys::REQUIRES_ENROLLMENT,
    keys::TAGS,
    keys::LANGUAGE,
    keys::COURSE_SKILL_LEVEL,
    keys::CHAPTER_SUMMARY,
    keys::LAST_MODIFIED,
    keys::DISTANCE,
];

/// Presentation projection of an evidence item with its display rank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// 1-based position in the final evidence order
    pub rank: usize,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl Source {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn doc_type(&self) -> Option<&str> {
        self.get(keys::DOC_TYPE).and_then(Value::as_str)
    }
}

/// Build the source list for the evidence actually used in generation
pub fn extract_sources(items: &[EvidenceItem]) -> Vec<Source> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| Source {
            rank: idx + 1,
            fields: SOURCE_KEYS
                .iter()
                .filter_map(|key| item.get(key).map(|v| (key.to_string(), v.clone())))
                .collect(),
        })
        .collect()
}
