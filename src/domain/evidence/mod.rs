//! Evidence items and their presentation projections
//!
//! An [`EvidenceItem`] is the unit of context handed to generation. Items are
//! produced by the retrieval and web search stages and never mutated; stages
//! replace the whole collection when they filter or append.

mod context;
mod item;
mod source;

pub use context::{build_context, join_contents, CONTEXT_SEPARATOR, HEADER_SEPARATOR};
pub use item::{keys, EvidenceItem, WEB_SEARCH_DOC_TYPE};
pub use source::{extract_sources, Source, SOURCE_KEYS};
