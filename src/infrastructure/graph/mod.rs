//! Orchestration graph implementation

mod executor;

pub use executor::{RagGraph, RagGraphConfig};
