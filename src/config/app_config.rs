use std::time::Duration;

use serde::Deserialize;

use crate::domain::{QueryEnhancementConfig, RetryConfig};

/// Application configuration
///
/// Layered from `config/default.toml`, an optional `config/local.toml` and
/// `APP__SECTION__KEY` environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub llm: LlmConfig,
    pub rate_limit: RateLimitConfig,
    pub retrieval: RetrievalConfig,
    pub embedding: EmbeddingConfig,
    pub database: DatabaseConfig,
    pub web_search: WebSearchConfig,
    pub graph: GraphConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI-compatible base URL including the version segment
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Provider quota; 0 disables throttling
    pub requests_per_minute: u32,
    /// Fraction of the quota actually used
    pub safety_margin: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalBackend {
    #[default]
    Memory,
    Pgvector,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub backend: RetrievalBackend,
    pub top_k: usize,
    pub short_question_tokens: usize,
    pub answer_prefix_chars: usize,
    pub timeout_secs: u64,
    /// pgvector table holding content, metadata and embedding columns
    pub table: String,
    /// JSON file of evidence items loaded by the memory backend
    pub seed_file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub dimensions: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebSearchConfig {
    pub base_url: String,
    pub api_key: String,
    pub max_results: usize,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub max_generation_attempts: u32,
    pub max_steps: u32,
    pub grading_retries: u32,
    pub retry_initial_delay_ms: u64,
    pub greeting_reply: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8001,
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            api_key: String::new(),
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.0,
            timeout_secs: 60,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 10,
            safety_margin: 0.8,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            backend: RetrievalBackend::default(),
            top_k: 4,
            short_question_tokens: 5,
            answer_prefix_chars: 200,
            timeout_secs: 30,
            table: "course_chunks".to_string(),
            seed_file: None,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            api_key: String::new(),
            model: "text-embedding-004".to_string(),
            dimensions: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 5,
            connect_timeout_secs: 10,
        }
    }
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.tavily.com".to_string(),
            api_key: String::new(),
            max_results: 3,
            timeout_secs: 30,
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_generation_attempts: 3,
            max_steps: 25,
            grading_retries: 2,
            retry_initial_delay_ms: 500,
            greeting_reply: "Hello! I'm your course assistant. Ask me anything about your \
                             courses, lessons or programming topics."
                .to_string(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl RetrievalConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn query_enhancement(&self) -> QueryEnhancementConfig {
        QueryEnhancementConfig {
            short_question_tokens: self.short_question_tokens,
            answer_prefix_chars: self.answer_prefix_chars,
        }
    }
}

impl WebSearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl GraphConfig {
    pub fn grading_retry(&self) -> RetryConfig {
        RetryConfig::new(self.grading_retries).with_initial_delay(self.retry_initial_delay_ms)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: Self = config.try_deserialize()?;
        app_config.apply_env_fallbacks(|key| std::env::var(key).ok());
        Ok(app_config)
    }

    /// Fill empty secrets from the conventional provider variables
    fn apply_env_fallbacks(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let first = |keys: &[&str]| keys.iter().find_map(|k| lookup(k).filter(|v| !v.is_empty()));

        if self.llm.api_key.is_empty() {
            if let Some(key) = first(&["LLM_API_KEY", "GEMINI_API_KEY", "GOOGLE_API_KEY"]) {
                self.llm.api_key = key;
            }
        }

        if self.embedding.api_key.is_empty() {
            self.embedding.api_key = self.llm.api_key.clone();
        }

        if self.web_search.api_key.is_empty() {
            if let Some(key) = first(&["TAVILY_API_KEY"]) {
                self.web_search.api_key = key;
            }
        }

        if self.database.url.is_empty() {
            if let Some(url) = first(&["DATABASE_URL"]) {
                self.database.url = url;
            }
        }
    }
}
