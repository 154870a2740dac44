mod app_config;

pub use app_config::{
    AppConfig, DatabaseConfig, EmbeddingConfig, GraphConfig, LlmConfig, LogFormat,
    LoggingConfig, MetricsConfig, RateLimitConfig, RetrievalBackend, RetrievalConfig,
    ServerConfig, WebSearchConfig,
};
