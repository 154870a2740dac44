//! Web search infrastructure

mod stage;
mod tavily;

pub use stage::WebSearchStage;
pub use tavily::TavilySearchProvider;
