use thiserror::Error;

/// Core domain errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("Invalid model output: {message}")]
    InvalidModelOutput { message: String },

    #[error("Timeout in '{operation}' after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn invalid_model_output(message: impl Into<String>) -> Self {
        Self::InvalidModelOutput {
            message: message.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Whether retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Provider { .. })
    }
}

/// Run a future under a deadline, mapping expiry to [`DomainError::Timeout`]
pub async fn with_timeout<T, F>(
    operation: &str,
    timeout: std::time::Duration,
    future: F,
) -> Result<T, DomainError>
where
    F: std::future::Future<Output = Result<T, DomainError>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(DomainError::timeout(operation, timeout.as_millis() as u64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Course 'c-1' not found");
        assert_eq!(error.to_string(), "Not found: Course 'c-1' not found");
    }

    #[test]
    fn test_validation_error() {
        let error = DomainError::validation("Question cannot be empty");
        assert_eq!(error.to_string(), "Validation error: Question cannot be empty");
    }

    #[test]
    fn test_timeout_error() {
        let error = DomainError::timeout("llm.chat", 5000);
        assert_eq!(error.to_string(), "Timeout in 'llm.chat' after 5000ms");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(DomainError::timeout("x", 1).is_retryable());
        assert!(DomainError::provider("openai", "HTTP 503").is_retryable());
        assert!(!DomainError::invalid_model_output("bad enum").is_retryable());
        assert!(!DomainError::validation("empty").is_retryable());
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_timeout_expires() {
        let result: Result<(), DomainError> = with_timeout("slow", Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .await;

        assert_eq!(result, Err(DomainError::timeout("slow", 50)));
    }

    #[tokio::test]
    async fn test_with_timeout_passes_through() {
        let result = with_timeout("fast", Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(result, Ok(7));
    }
}
