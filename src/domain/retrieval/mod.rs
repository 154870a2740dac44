//! Retrieval contracts and access control
//!
//! The vector index and the enrollment store are external collaborators; only
//! the narrow read operations the pipeline needs are modeled here.

mod access;

pub use access::filter_by_enrollment;

use std::collections::HashSet;
use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::evidence::EvidenceItem;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Similarity search over indexed course content
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VectorRetriever: Send + Sync + Debug {
    /// Most similar items first; each carries a `distance` metadata value
    async fn search(&self, query: &str) -> Result<Vec<EvidenceItem>, DomainError>;

    fn retriever_name(&self) -> &'static str;
}

/// Turns query text into a vector in the index's embedding space
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;

    fn provider_name(&self) -> &'static str;
}

/// Read-only lookup of a member's course enrollments
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EnrollmentStore: Send + Sync + Debug {
    async fn enrolled_course_ids(&self, user_id: &str) -> Result<HashSet<String>, DomainError>;
}
