//! PostgreSQL connection pool

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::domain::DomainError;

pub async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool, DomainError> {
    if config.url.trim().is_empty() {
        return Err(DomainError::configuration(
            "Database URL is not set (database.url or DATABASE_URL)",
        ));
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect(&config.url)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

    info!(max_connections = config.max_connections, "Connected to PostgreSQL");
    Ok(pool)
}
