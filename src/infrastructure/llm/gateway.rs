//! Rate-limited model gateway
//!
//! Every model call in the service goes through [`ModelGateway`]: it waits on
//! the shared [`SlidingWindowLimiter`], bounds the call with a timeout and
//! records metrics. It never retries; errors propagate unchanged.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::rate_limiter::SlidingWindowLimiter;
use crate::config::LlmConfig;
use crate::domain::llm::LlmJsonSchema;
use crate::domain::{with_timeout, DomainError, LlmProvider, LlmRequest, LlmResponse};
use crate::infrastructure::observability::{record_llm_request, LlmRequestMetricParams};

#[derive(Debug, Clone)]
pub struct ModelGateway {
    provider: Arc<dyn LlmProvider>,
    limiter: Arc<SlidingWindowLimiter>,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl ModelGateway {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        limiter: Arc<SlidingWindowLimiter>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            limiter,
            model: model.into(),
            temperature: 0.0,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn from_config(
        provider: Arc<dyn LlmProvider>,
        limiter: Arc<SlidingWindowLimiter>,
        config: &LlmConfig,
    ) -> Self {
        Self::new(provider, limiter, &config.model)
            .with_temperature(config.temperature)
            .with_timeout(config.timeout())
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Throttle, then send one request under the call timeout
    pub async fn invoke(&self, request: LlmRequest) -> Result<LlmResponse, DomainError> {
        self.limiter.acquire().await;

        let start = Instant::now();
        let result = with_timeout(
            "llm.chat",
            self.timeout,
            self.provider.chat(&self.model, request),
        )
        .await;

        let usage = result.as_ref().ok().and_then(|r| r.usage.as_ref());
        record_llm_request(LlmRequestMetricParams {
            provider: self.provider.provider_name(),
            model: &self.model,
            duration: start.elapsed(),
            success: result.is_ok(),
            input_tokens: usage.map(|u| u.prompt_tokens as u64),
            output_tokens: usage.map(|u| u.completion_tokens as u64),
        });

        if let Err(ref e) = result {
            warn!(model = %self.model, error = %e, "Model call failed");
        }

        result
    }

    /// Plain-text completion
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, DomainError> {
        let request = LlmRequest::builder()
            .system(system)
            .user(user)
            .temperature(self.temperature)
            .build();

        let response = self.invoke(request).await?;
        let content = response.content().unwrap_or_default().trim().to_string();

        debug!(model = %self.model, chars = content.len(), "Completion received");
        Ok(content)
    }

    /// Schema-constrained completion parsed into `T`
    ///
    /// Output that does not deserialize into `T` is an
    /// [`DomainError::InvalidModelOutput`], never coerced.
    pub async fn structured<T: DeserializeOwned>(
        &self,
        system: &str,
        user: &str,
        schema: LlmJsonSchema,
    ) -> Result<T, DomainError> {
        let schema_name = schema.name.clone();
        let request = LlmRequest::builder()
            .system(system)
            .user(user)
            .temperature(self.temperature)
            .json_schema(schema)
            .build();

        let response = self.invoke(request).await?;
        let content = response.content().ok_or_else(|| {
            DomainError::invalid_model_output(format!("Empty response for '{}'", schema_name))
        })?;

        parse_structured(content, &schema_name)
    }
}

/// Deserialize a model reply, tolerating surrounding prose or code fences
fn parse_structured<T: DeserializeOwned>(
    content: &str,
    schema_name: &str,
) -> Result<T, DomainError> {
    let json_str = extract_json(content).unwrap_or(content);

    serde_json::from_str(json_str).map_err(|e| {
        warn!(schema = schema_name, response = content, "Unparseable structured output");
        DomainError::invalid_model_output(format!("{}: {}", schema_name, e))
    })
}

/// Extract JSON object from a string (handles markdown code blocks)
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grading::BinaryScore;
    use crate::domain::llm::MockLlmProvider;
    use crate::domain::routing::{DataSource, RouteQuery};

    fn gateway(provider: MockLlmProvider) -> (ModelGateway, Arc<MockLlmProvider>) {
        let provider = Arc::new(provider);
        let gateway = ModelGateway::new(
            provider.clone(),
            Arc::new(SlidingWindowLimiter::disabled()),
            "gemini-2.5-flash",
        );
        (gateway, provider)
    }

    fn score_schema() -> LlmJsonSchema {
        LlmJsonSchema::strict("binary_score", BinaryScore::json_schema())
    }

    #[test]
    fn test_extract_json() {
        let text = "```json\n{\"binary_score\": true}\n```";
        assert_eq!(extract_json(text), Some("{\"binary_score\": true}"));
        assert_eq!(extract_json("no json here"), None);
    }

    #[tokio::test]
    async fn test_complete_sends_system_and_user() {
        let (gateway, provider) = gateway(MockLlmProvider::new("mock").with_response("  answer \n"));

        let content = gateway.complete("be helpful", "question").await.unwrap();

        assert_eq!(content, "answer");
        let request = provider.last_request().unwrap();
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].content_text(), "be helpful");
        assert_eq!(request.temperature, Some(0.0));
        assert!(!request.is_structured());
    }

    #[tokio::test]
    async fn test_structured_parses_output() {
        let (gateway, provider) =
            gateway(MockLlmProvider::new("mock").with_response(r#"{"binary_score": true}"#));

        let score: BinaryScore = gateway.structured("grade", "doc", score_schema()).await.unwrap();

        assert!(score.binary_score);
        assert!(provider.last_request().unwrap().is_structured());
    }

    #[tokio::test]
    async fn test_structured_rejects_out_of_enum_value() {
        let (gateway, _) =
            gateway(MockLlmProvider::new("mock").with_response(r#"{"datasource": "sql"}"#));

        let result: Result<RouteQuery, _> = gateway
            .structured(
                "route",
                "q",
                LlmJsonSchema::strict("route_query", RouteQuery::json_schema()),
            )
            .await;

        assert!(matches!(result, Err(DomainError::InvalidModelOutput { .. })));
    }

    #[tokio::test]
    async fn test_structured_rejects_non_boolean_score() {
        let (gateway, _) =
            gateway(MockLlmProvider::new("mock").with_response(r#"{"binary_score": "yes"}"#));

        let result: Result<BinaryScore, _> =
            gateway.structured("grade", "doc", score_schema()).await;

        assert!(matches!(result, Err(DomainError::InvalidModelOutput { .. })));
    }

    #[tokio::test]
    async fn test_structured_accepts_fenced_output() {
        let (gateway, _) = gateway(
            MockLlmProvider::new("mock").with_response("```json\n{\"datasource\": \"web_search\"}\n```"),
        );

        let route: RouteQuery = gateway
            .structured(
                "route",
                "q",
                LlmJsonSchema::strict("route_query", RouteQuery::json_schema()),
            )
            .await
            .unwrap();

        assert_eq!(route.datasource, DataSource::WebSearch);
    }

    #[tokio::test]
    async fn test_each_call_reaches_the_provider() {
        let (gateway, provider) = gateway(
            MockLlmProvider::new("mock")
                .with_queued(r#"{"binary_score": false}"#)
                .with_queued(r#"{"binary_score": true}"#),
        );

        let first: BinaryScore = gateway.structured("grade", "doc", score_schema()).await.unwrap();
        let second: BinaryScore = gateway.structured("grade", "doc", score_schema()).await.unwrap();

        assert!(!first.binary_score);
        assert!(second.binary_score);
        assert_eq!(provider.call_count(), 2);
        assert!(gateway.complete("s", "u").await.is_err());
    }

    #[tokio::test]
    async fn test_provider_error_propagates_unmodified() {
        let (gateway, provider) = gateway(MockLlmProvider::new("mock").with_error("HTTP 429"));

        let result = gateway.complete("s", "u").await;

        assert_eq!(result, Err(DomainError::provider("mock", "HTTP 429")));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_call_times_out() {
        let (gateway, _) = gateway(
            MockLlmProvider::new("mock")
                .with_response("late")
                .with_delay(Duration::from_secs(120)),
        );
        let gateway = gateway.with_timeout(Duration::from_secs(30));

        let result = gateway.complete("s", "u").await;

        assert_eq!(result, Err(DomainError::timeout("llm.chat", 30000)));
        assert!(result.unwrap_err().is_retryable());
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_call_passes_the_limiter() {
        let provider = Arc::new(MockLlmProvider::new("mock").with_response("ok"));
        let limiter = Arc::new(SlidingWindowLimiter::with_limits(
            2,
            Duration::ZERO,
            Duration::from_secs(60),
        ));
        let gateway = ModelGateway::new(provider.clone(), limiter, "m");
        let start = tokio::time::Instant::now();

        for _ in 0..3 {
            gateway.complete("s", "u").await.unwrap();
        }

        assert!(start.elapsed() >= Duration::from_secs(59));
        assert_eq!(provider.call_count(), 3);
    }
}
