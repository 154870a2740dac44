use std::sync::Arc;

use super::http_client::HttpClient;
use super::OpenAiProvider;
use crate::config::LlmConfig;
use crate::domain::{DomainError, LlmProvider};

/// Factory for creating LLM providers
#[derive(Debug)]
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create the chat provider described by `config`
    ///
    /// The HTTP client deadline is a little longer than the per-call timeout
    /// so the gateway's timeout is the one that surfaces.
    pub fn create(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, DomainError> {
        if config.api_key.trim().is_empty() {
            return Err(DomainError::configuration(
                "LLM API key is not set (llm.api_key, LLM_API_KEY or GEMINI_API_KEY)",
            ));
        }

        let http_client = HttpClient::with_timeout(config.timeout() + HTTP_GRACE)?;
        let provider = OpenAiProvider::with_base_url(http_client, &config.api_key, &config.base_url);

        Ok(Arc::new(provider))
    }
}

const HTTP_GRACE: std::time::Duration = std::time::Duration::from_secs(5);
