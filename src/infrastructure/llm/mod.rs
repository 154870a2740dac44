//! LLM provider implementations and the rate-limited gateway

mod factory;
mod gateway;
mod http_client;
mod openai;
mod rate_limiter;

pub use factory::LlmProviderFactory;
pub use gateway::ModelGateway;
pub use http_client::{HttpClient, HttpClientTrait};
pub use openai::{OpenAiProvider, GEMINI_OPENAI_BASE_URL};
pub use rate_limiter::SlidingWindowLimiter;

#[cfg(test)]
pub use http_client::mock::MockHttpClient;
