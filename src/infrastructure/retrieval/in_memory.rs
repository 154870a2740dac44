//! In-memory retriever for development and testing
//!
//! Ranks items by lexical overlap with the query instead of embeddings. The
//! reported `distance` is the fraction of query terms an item does not contain.

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::evidence::{keys, EvidenceItem};
use crate::domain::{DomainError, VectorRetriever};

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "do", "does", "for", "from", "how", "in",
    "is", "it", "me", "of", "on", "or", "the", "to", "what", "when", "where", "which", "who",
    "why", "with",
];

#[derive(Debug, Clone, Default)]
pub struct InMemoryRetriever {
    items: Vec<EvidenceItem>,
    top_k: usize,
}

impl InMemoryRetriever {
    pub fn new(items: Vec<EvidenceItem>, top_k: usize) -> Self {
        Self { items, top_k }
    }

    /// Load items from a JSON array of `{content, metadata}` objects
    pub fn from_json_file(path: impl AsRef<Path>, top_k: usize) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DomainError::configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let items: Vec<EvidenceItem> = serde_json::from_str(&raw).map_err(|e| {
            DomainError::configuration(format!("Invalid evidence file {}: {}", path.display(), e))
        })?;

        Ok(Self::new(items, top_k))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|t| t.chars().count() > 1 && !STOPWORDS.contains(&t.as_str()))
        .collect()
}

fn searchable_text(item: &EvidenceItem) -> String {
    let mut text = item.content.clone();
    for key in [keys::COURSE_TITLE, keys::CHAPTER_TITLE, keys::LESSON_TITLE] {
        if let Some(title) = item.get_str(key) {
            text.push(' ');
            text.push_str(&title);
        }
    }
    text
}

#[async_trait]
impl VectorRetriever for InMemoryRetriever {
    async fn search(&self, query: &str) -> Result<Vec<EvidenceItem>, DomainError> {
        let query_terms = terms(query);
        if query_terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(f64, &EvidenceItem)> = self
            .items
            .iter()
            .filter_map(|item| {
                let item_terms = terms(&searchable_text(item));
                let matched = query_terms.intersection(&item_terms).count();
                (matched > 0).then(|| {
                    let distance = 1.0 - matched as f64 / query_terms.len() as f64;
                    (distance, item)
                })
            })
            .collect();

        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(scored
            .into_iter()
            .take(self.top_k)
            .map(|(distance, item)| item.clone().with_metadata(keys::DISTANCE, json!(distance)))
            .collect())
    }

    fn retriever_name(&self) -> &'static str {
        "in_memory"
    }
}
