//! Course RAG Gateway
//!
//! Answers questions about course content through a graded, self-correcting
//! pipeline:
//! - Greeting short-circuit and model-backed routing
//! - Retrieval with follow-up query rewriting and enrollment filtering
//! - Relevance, hallucination and answer grading with web search fallback

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, warn};

use api::{AppState, DatabaseProbe};
use config::{RetrievalBackend, WebSearchConfig};
use domain::{DomainError, EnrollmentStore, QuestionRouter, VectorRetriever};
use infrastructure::{
    database::connect_pool,
    embedding::{HttpClient, OpenAiEmbeddingProvider},
    generation::LlmAnswerGenerator,
    grading::LlmEvidenceGrader,
    graph::{RagGraph, RagGraphConfig},
    llm::{LlmProviderFactory, ModelGateway, SlidingWindowLimiter},
    retrieval::{
        InMemoryEnrollmentStore, InMemoryRetriever, PgvectorRetriever, PostgresEnrollmentStore,
        RetrievalStage,
    },
    routing::LlmQuestionClassifier,
    web_search::{TavilySearchProvider, WebSearchStage},
};

/// Create the application state, connecting to Postgres when the pgvector
/// backend is selected
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let pool = match config.retrieval.backend {
        RetrievalBackend::Pgvector => Some(connect_pool(&config.database).await?),
        RetrievalBackend::Memory => None,
    };

    let graph = build_graph(config, pool.clone())?;
    let mut state = AppState::new(Arc::new(graph));

    if let Some(pool) = pool {
        state = state.with_probe(Arc::new(DatabaseProbe::new(pool)));
    }

    Ok(state)
}

/// Wire every stage of the answer graph. All model calls share one limiter.
pub fn build_graph(config: &AppConfig, pool: Option<PgPool>) -> Result<RagGraph, DomainError> {
    let limiter = Arc::new(SlidingWindowLimiter::from_config(&config.rate_limit));
    let provider = LlmProviderFactory::create(&config.llm)?;
    let gateway = ModelGateway::from_config(provider, limiter, &config.llm);

    info!(
        model = %gateway.model(),
        requests_per_minute = config.rate_limit.requests_per_minute,
        backend = ?config.retrieval.backend,
        "Building answer graph"
    );

    let router = QuestionRouter::new(Arc::new(LlmQuestionClassifier::new(gateway.clone())));
    let grader = Arc::new(LlmEvidenceGrader::new(gateway.clone()));
    let generator = Arc::new(LlmAnswerGenerator::new(gateway));

    let (retriever, enrollments) = create_retrieval_backends(config, pool)?;
    let retrieval = RetrievalStage::new(retriever, enrollments)
        .with_enhancement(config.retrieval.query_enhancement())
        .with_timeout(config.retrieval.timeout());

    let web_search = create_web_search(&config.web_search)?;

    Ok(RagGraph::new(router, retrieval, grader, generator, web_search)
        .with_config(RagGraphConfig::from(&config.graph)))
}

type RetrievalBackends = (Arc<dyn VectorRetriever>, Arc<dyn EnrollmentStore>);

fn create_retrieval_backends(
    config: &AppConfig,
    pool: Option<PgPool>,
) -> Result<RetrievalBackends, DomainError> {
    match config.retrieval.backend {
        RetrievalBackend::Memory => {
            let retriever = match config.retrieval.seed_file.as_deref() {
                Some(path) => InMemoryRetriever::from_json_file(path, config.retrieval.top_k)?,
                None => {
                    warn!("No retrieval seed file configured, in-memory index is empty");
                    InMemoryRetriever::new(Vec::new(), config.retrieval.top_k)
                }
            };
            info!(documents = retriever.len(), "Using in-memory retriever");

            Ok((Arc::new(retriever), Arc::new(InMemoryEnrollmentStore::new())))
        }
        RetrievalBackend::Pgvector => {
            let pool = pool.ok_or_else(|| {
                DomainError::configuration("pgvector backend requires a database connection")
            })?;

            if config.embedding.api_key.trim().is_empty() {
                return Err(DomainError::configuration(
                    "Embedding API key is not set (embedding.api_key or LLM_API_KEY)",
                ));
            }

            let http_client = HttpClient::with_timeout(config.retrieval.timeout())?;
            let embedder = OpenAiEmbeddingProvider::with_base_url(
                http_client,
                &config.embedding.api_key,
                &config.embedding.model,
                &config.embedding.base_url,
            )
            .with_dimensions(config.embedding.dimensions);

            let retriever = PgvectorRetriever::new(
                pool.clone(),
                Arc::new(embedder),
                &config.retrieval.table,
                config.retrieval.top_k,
            )?;

            Ok((
                Arc::new(retriever),
                Arc::new(PostgresEnrollmentStore::new(pool)),
            ))
        }
    }
}

fn create_web_search(config: &WebSearchConfig) -> Result<WebSearchStage, DomainError> {
    if config.api_key.trim().is_empty() {
        return Err(DomainError::configuration(
            "Web search API key is not set (web_search.api_key or TAVILY_API_KEY)",
        ));
    }

    let http_client = HttpClient::with_timeout(config.timeout())?;
    let provider =
        TavilySearchProvider::with_base_url(http_client, &config.api_key, &config.base_url);

    Ok(WebSearchStage::new(Arc::new(provider))
        .with_max_results(config.max_results)
        .with_timeout(config.timeout()))
}
