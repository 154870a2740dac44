//! Retrieval stage: follow-up rewriting, vector search and enrollment filtering

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::domain::conversation::{enhance_query, ChatTurn, QueryEnhancementConfig};
use crate::domain::evidence::EvidenceItem;
use crate::domain::retrieval::filter_by_enrollment;
use crate::domain::{with_timeout, DomainError, EnrollmentStore, VectorRetriever};

/// What the retrieval stage adds to the execution state
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalOutput {
    pub evidence: Vec<EvidenceItem>,
    pub enhanced_query: Option<String>,
    /// Items returned by the index before access filtering
    pub retrieved: usize,
}

impl RetrievalOutput {
    pub fn filtered_out(&self) -> usize {
        self.retrieved - self.evidence.len()
    }
}

#[derive(Debug, Clone)]
pub struct RetrievalStage {
    retriever: Arc<dyn VectorRetriever>,
    enrollments: Arc<dyn EnrollmentStore>,
    enhancement: QueryEnhancementConfig,
    timeout: Duration,
}

impl RetrievalStage {
    pub fn new(retriever: Arc<dyn VectorRetriever>, enrollments: Arc<dyn EnrollmentStore>) -> Self {
        Self {
            retriever,
            enrollments,
            enhancement: QueryEnhancementConfig::default(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_enhancement(mut self, enhancement: QueryEnhancementConfig) -> Self {
        self.enhancement = enhancement;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn retrieve(
        &self,
        question: &str,
        user_id: Option<&str>,
        chat_history: &[ChatTurn],
    ) -> Result<RetrievalOutput, DomainError> {
        let enhanced_query = enhance_query(question, chat_history, &self.enhancement);
        if let Some(ref query) = enhanced_query {
            info!(query = %query, "Using history-enhanced retrieval query");
        }
        let query = enhanced_query.as_deref().unwrap_or(question);

        let items = with_timeout(
            "retrieval.search",
            self.timeout,
            self.retriever.search(query),
        )
        .await?;
        let retrieved = items.len();

        let evidence = match user_id {
            Some(user_id) => {
                let enrolled = with_timeout(
                    "retrieval.enrollments",
                    self.timeout,
                    self.enrollments.enrolled_course_ids(user_id),
                )
                .await?;
                filter_by_enrollment(items, &enrolled)
            }
            None => items,
        };

        debug!(
            retriever = self.retriever.retriever_name(),
            retrieved,
            kept = evidence.len(),
            "Retrieval finished"
        );

        Ok(RetrievalOutput {
            evidence,
            enhanced_query,
            retrieved,
        })
    }
}
