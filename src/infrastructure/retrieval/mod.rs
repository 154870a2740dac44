//! Retrieval infrastructure: vector search backends, enrollment stores and
//! the retrieval stage that combines them

mod enrollment;
mod in_memory;
mod pgvector;
mod stage;

pub use enrollment::{InMemoryEnrollmentStore, PostgresEnrollmentStore};
pub use in_memory::InMemoryRetriever;
pub use pgvector::PgvectorRetriever;
pub use stage::{RetrievalOutput, RetrievalStage};
