//! OpenAI-compatible embedding provider implementation

use async_trait::async_trait;
use serde::Deserialize;

use super::HttpClientTrait;
use crate::domain::{DomainError, EmbeddingProvider};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Query embedder for `/embeddings` endpoints (OpenAI, Gemini compatibility layer)
#[derive(Debug)]
pub struct OpenAiEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    model: String,
    dimensions: Option<u32>,
}

impl<C: HttpClientTrait> OpenAiEmbeddingProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, model, DEFAULT_OPENAI_BASE_URL)
    }

    /// `base_url` includes the version segment
    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = format!("Bearer {}", api_key.into());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth_header,
            base_url,
            model: model.into(),
            dimensions: None,
        }
    }

    pub fn with_dimensions(mut self, dimensions: Option<u32>) -> Self {
        self.dimensions = dimensions;
        self
    }

    fn embeddings_url(&self) -> String {
        format!("{}/embeddings", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_request(&self, text: &str) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "input": text,
        });

        if let Some(dims) = self.dimensions {
            body["dimensions"] = serde_json::json!(dims);
        }

        body
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for OpenAiEmbeddingProvider<C> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let url = self.embeddings_url();
        let body = self.build_request(text);
        let json = self.client.post_json(&url, self.headers(), &body).await?;

        let response: OpenAiEmbeddingResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse embedding response: {}", e))
        })?;

        response
            .data
            .into_iter()
            .min_by_key(|d| d.index)
            .map(|d| d.embedding)
            .ok_or_else(|| DomainError::provider("openai", "No embedding in response"))
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

// OpenAI API types for embeddings

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingResponse {
    data: Vec<OpenAiEmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::MockHttpClient;

    const TEST_URL: &str = "https://api.openai.com/v1/embeddings";

    fn create_mock_response(dimensions: usize) -> serde_json::Value {
        let embedding: Vec<f32> = (0..dimensions).map(|j| j as f32 * 0.001).collect();
        serde_json::json!({
            "model": "text-embedding-004",
            "data": [{ "index": 0, "embedding": embedding, "object": "embedding" }],
            "usage": { "prompt_tokens": 3, "total_tokens": 3 }
        })
    }

    #[tokio::test]
    async fn test_embed_query() {
        let client = MockHttpClient::new().with_response(TEST_URL, create_mock_response(768));
        let provider = OpenAiEmbeddingProvider::new(client, "key", "text-embedding-004")
            .with_dimensions(Some(768));

        let embedding = provider.embed("What is SQL?").await.unwrap();

        assert_eq!(embedding.len(), 768);
        let body = provider.client.last_body().unwrap();
        assert_eq!(body["input"], "What is SQL?");
        assert_eq!(body["model"], "text-embedding-004");
        assert_eq!(body["dimensions"], 768);
    }

    #[tokio::test]
    async fn test_empty_data_is_error() {
        let client = MockHttpClient::new()
            .with_response(TEST_URL, serde_json::json!({"model": "m", "data": []}));
        let provider = OpenAiEmbeddingProvider::new(client, "key", "m");

        assert!(provider.embed("q").await.is_err());
    }

    #[tokio::test]
    async fn test_http_error_propagates() {
        let client = MockHttpClient::new().with_error(TEST_URL, "HTTP 401");
        let provider = OpenAiEmbeddingProvider::new(client, "bad", "m");

        assert!(matches!(
            provider.embed("q").await,
            Err(DomainError::Provider { .. })
        ));
    }
}
