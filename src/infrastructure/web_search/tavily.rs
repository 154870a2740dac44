//! Tavily search API client

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{DomainError, WebSearchProvider, WebSearchResult};
use crate::infrastructure::llm::HttpClientTrait;

const DEFAULT_TAVILY_BASE_URL: &str = "https://api.tavily.com";

#[derive(Debug)]
pub struct TavilySearchProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
}

impl<C: HttpClientTrait> TavilySearchProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_TAVILY_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            auth_header: format!("Bearer {}", api_key.into()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

#[async_trait]
impl<C: HttpClientTrait> WebSearchProvider for TavilySearchProvider<C> {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<WebSearchResult>, DomainError> {
        let body = serde_json::json!({
            "query": query,
            "max_results": max_results,
            "search_depth": "basic",
        });
        let headers = vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ];

        let json = self
            .client
            .post_json(&self.search_url(), headers, &body)
            .await
            .map_err(|e| match e {
                DomainError::Provider { message, .. } => DomainError::provider("tavily", message),
                other => other,
            })?;

        let response: TavilyResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("tavily", format!("Failed to parse response: {}", e))
        })?;

        Ok(response
            .results
            .into_iter()
            .take(max_results)
            .map(|r| WebSearchResult::new(r.content).with_title(r.title).with_url(r.url))
            .collect())
    }

    fn provider_name(&self) -> &'static str {
        "tavily"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::MockHttpClient;

    const TEST_URL: &str = "https://api.tavily.com/search";

    #[tokio::test]
    async fn test_search_maps_results() {
        let response = serde_json::json!({
            "query": "rust release",
            "results": [
                {"title": "Rust 1.90", "url": "https://blog.rust-lang.org", "content": "Released today", "score": 0.9},
                {"title": "Changelog", "url": "https://github.com/rust-lang/rust", "content": "Notes"}
            ]
        });
        let client = MockHttpClient::new().with_response(TEST_URL, response);
        let provider = TavilySearchProvider::new(client, "tvly-key");

        let results = provider.search("rust release", 3).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, "Released today");
        assert_eq!(results[1].url, "https://github.com/rust-lang/rust");

        let body = provider.client.last_body().unwrap();
        assert_eq!(body["query"], "rust release");
        assert_eq!(body["max_results"], 3);
        assert_eq!(
            provider.client.last_header("Authorization").as_deref(),
            Some("Bearer tvly-key")
        );
    }

    #[tokio::test]
    async fn test_failure_is_attributed_to_tavily() {
        let client = MockHttpClient::new().with_error(TEST_URL, "HTTP 432: quota exceeded");
        let provider = TavilySearchProvider::new(client, "tvly-key");

        let result = provider.search("q", 3).await;

        assert_eq!(
            result,
            Err(DomainError::provider("tavily", "HTTP 432: quota exceeded"))
        );
    }

    #[tokio::test]
    async fn test_search_against_http_server() {
        use crate::infrastructure::llm::HttpClient;
        use wiremock::matchers::{body_partial_json, header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("authorization", "Bearer tvly-key"))
            .and(body_partial_json(serde_json::json!({"query": "sqlx 0.8", "max_results": 2})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{"title": "sqlx", "url": "https://docs.rs/sqlx", "content": "Async SQL toolkit"}]
            })))
            .mount(&server)
            .await;

        let provider = TavilySearchProvider::with_base_url(HttpClient::new(), "tvly-key", server.uri());
        let results = provider.search("sqlx 0.8", 2).await.unwrap();

        assert_eq!(
            results,
            vec![WebSearchResult::new("Async SQL toolkit")
                .with_title("sqlx")
                .with_url("https://docs.rs/sqlx")]
        );
    }

    #[tokio::test]
    async fn test_http_error_status_is_reported() {
        use crate::infrastructure::llm::HttpClient;
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let provider = TavilySearchProvider::with_base_url(HttpClient::new(), "bad", server.uri());
        let err = provider.search("q", 3).await.unwrap_err();

        match err {
            DomainError::Provider { provider, message } => {
                assert_eq!(provider, "tavily");
                assert!(message.contains("401"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
