use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::domain::evidence::EvidenceItem;
use crate::domain::web_search::results_to_evidence;
use crate::domain::{with_timeout, DomainError, WebSearchProvider};

/// Appends one web search evidence item to the current evidence
#[derive(Debug, Clone)]
pub struct WebSearchStage {
    provider: Arc<dyn WebSearchProvider>,
    max_results: usize,
    timeout: Duration,
}

impl WebSearchStage {
    pub fn new(provider: Arc<dyn WebSearchProvider>) -> Self {
        Self {
            provider,
            max_results: 3,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn search(
        &self,
        question: &str,
        mut evidence: Vec<EvidenceItem>,
    ) -> Result<Vec<EvidenceItem>, DomainError> {
        let results = with_timeout(
            "web_search",
            self.timeout,
            self.provider.search(question, self.max_results),
        )
        .await?;

        debug!(
            provider = self.provider.provider_name(),
            results = results.len(),
            "Web search finished"
        );

        evidence.push(results_to_evidence(&results, self.provider.provider_name()));
        Ok(evidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    use crate::domain::web_search::{MockWebSearchProvider, WebSearchResult};

    fn provider_returning(results: Vec<WebSearchResult>) -> MockWebSearchProvider {
        let mut provider = MockWebSearchProvider::new();
        provider
            .expect_search()
            .with(eq("latest PostgreSQL release"), eq(3))
            .returning(move |_, _| Ok(results.clone()));
        provider.expect_provider_name().return_const("tavily");
        provider
    }

    #[tokio::test]
    async fn test_appends_single_item_after_existing_evidence() {
        let stage = WebSearchStage::new(Arc::new(provider_returning(vec![
            WebSearchResult::new("PostgreSQL 18 released"),
            WebSearchResult::new("New async I/O"),
        ])));
        let existing = vec![EvidenceItem::new("relevant course chunk")];

        let evidence = stage
            .search("latest PostgreSQL release", existing)
            .await
            .unwrap();

        assert_eq!(evidence.len(), 2);
        assert_eq!(evidence[0].content, "relevant course chunk");
        assert_eq!(evidence[1].content, "PostgreSQL 18 released\nNew async I/O");
        assert!(evidence[1].is_web_search());
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let mut provider = MockWebSearchProvider::new();
        provider
            .expect_search()
            .returning(|_, _| Err(DomainError::provider("tavily", "HTTP 500")));
        provider.expect_provider_name().return_const("tavily");
        let stage = WebSearchStage::new(Arc::new(provider));

        assert!(stage.search("q", Vec::new()).await.is_err());
    }
}
