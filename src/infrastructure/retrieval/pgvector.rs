//! pgvector retriever implementation

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use tracing::debug;

use crate::domain::evidence::{keys, EvidenceItem};
use crate::domain::{DomainError, EmbeddingProvider, VectorRetriever};

static TABLE_NAME: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$").ok());

/// Cosine-distance search over a table of `(content TEXT, metadata JSONB,
/// embedding vector)` rows
pub struct PgvectorRetriever {
    pool: PgPool,
    embedder: Arc<dyn EmbeddingProvider>,
    table: String,
    top_k: usize,
}

impl Debug for PgvectorRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgvectorRetriever")
            .field("table", &self.table)
            .field("top_k", &self.top_k)
            .field("embedder", &self.embedder)
            .finish()
    }
}

impl PgvectorRetriever {
    pub fn new(
        pool: PgPool,
        embedder: Arc<dyn EmbeddingProvider>,
        table: impl Into<String>,
        top_k: usize,
    ) -> Result<Self, DomainError> {
        let table = table.into();
        validate_table_name(&table)?;

        Ok(Self {
            pool,
            embedder,
            table,
            top_k,
        })
    }

    fn search_sql(&self) -> String {
        format!(
            r#"
            SELECT content, metadata, (embedding <=> $1::vector) AS distance
            FROM {}
            ORDER BY distance
            LIMIT $2
            "#,
            self.table
        )
    }
}

fn validate_table_name(table: &str) -> Result<(), DomainError> {
    let valid = TABLE_NAME.as_ref().is_some_and(|re| re.is_match(table));
    if valid {
        Ok(())
    } else {
        Err(DomainError::configuration(format!(
            "Invalid retrieval table name '{}'",
            table
        )))
    }
}

/// Convert embedding to pgvector text format
fn embedding_to_pgvector(embedding: &[f32]) -> String {
    let values: Vec<String> = embedding.iter().map(|v| v.to_string()).collect();
    format!("[{}]", values.join(","))
}

fn row_to_item(row: &PgRow) -> Result<EvidenceItem, DomainError> {
    let content: String = row
        .try_get("content")
        .map_err(|e| DomainError::storage(format!("Invalid content column: {}", e)))?;
    let metadata: Option<Value> = row
        .try_get("metadata")
        .map_err(|e| DomainError::storage(format!("Invalid metadata column: {}", e)))?;
    let distance: f64 = row
        .try_get("distance")
        .map_err(|e| DomainError::storage(format!("Invalid distance column: {}", e)))?;

    Ok(EvidenceItem::new(content)
        .with_all_metadata(metadata_map(metadata))
        .with_metadata(keys::DISTANCE, json!(distance)))
}

fn metadata_map(metadata: Option<Value>) -> HashMap<String, Value> {
    match metadata {
        Some(Value::Object(map)) => map.into_iter().collect(),
        _ => HashMap::new(),
    }
}

#[async_trait]
impl VectorRetriever for PgvectorRetriever {
    async fn search(&self, query: &str) -> Result<Vec<EvidenceItem>, DomainError> {
        let embedding = self.embedder.embed(query).await?;

        debug!(
            table = %self.table,
            dimensions = embedding.len(),
            top_k = self.top_k,
            "Searching pgvector"
        );

        let rows = sqlx::query(&self.search_sql())
            .bind(embedding_to_pgvector(&embedding))
            .bind(self.top_k as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Vector search failed: {}", e)))?;

        rows.iter().map(row_to_item).collect()
    }

    fn retriever_name(&self) -> &'static str {
        "pgvector"
    }
}
