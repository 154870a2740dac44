//! Web search contract

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::evidence::EvidenceItem;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// A single web search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    pub content: String,
}

impl WebSearchResult {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            url: String::new(),
            content: content.into(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// External search engine returning plain-text result snippets
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WebSearchProvider: Send + Sync + Debug {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<WebSearchResult>, DomainError>;

    fn provider_name(&self) -> &'static str;
}

/// Fold search hits into one evidence item, contents joined by newlines
pub fn results_to_evidence(results: &[WebSearchResult], provider: &str) -> EvidenceItem {
    let content = results
        .iter()
        .map(|r| r.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    EvidenceItem::web_search(content, provider)
}
