//! Enrollment store implementations

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::{DomainError, EnrollmentStore};

/// PostgreSQL enrollment lookup (read-only)
#[derive(Debug, Clone)]
pub struct PostgresEnrollmentStore {
    pool: PgPool,
}

impl PostgresEnrollmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EnrollmentStore for PostgresEnrollmentStore {
    async fn enrolled_course_ids(&self, user_id: &str) -> Result<HashSet<String>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT course_id::text AS course_id
            FROM enrollments
            WHERE member_id::text = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to fetch enrollments: {}", e)))?;

        rows.iter()
            .map(|row| {
                row.try_get::<Option<String>, _>("course_id")
                    .map_err(|e| DomainError::storage(format!("Invalid enrollment row: {}", e)))
            })
            .filter_map(|r| r.transpose())
            .collect()
    }
}

/// Fixed enrollment table for local runs and tests
#[derive(Debug, Clone, Default)]
pub struct InMemoryEnrollmentStore {
    enrollments: HashMap<String, HashSet<String>>,
}

impl InMemoryEnrollmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enrollment(mut self, user_id: impl Into<String>, course_id: impl Into<String>) -> Self {
        self.enrollments
            .entry(user_id.into())
            .or_default()
            .insert(course_id.into());
        self
    }
}

#[async_trait]
impl EnrollmentStore for InMemoryEnrollmentStore {
    async fn enrolled_course_ids(&self, user_id: &str) -> Result<HashSet<String>, DomainError> {
        Ok(self.enrollments.get(user_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_enrollments() {
        let store = InMemoryEnrollmentStore::new()
            .with_enrollment("m-1", "sql-101")
            .with_enrollment("m-1", "rust-201");

        let courses = store.enrolled_course_ids("m-1").await.unwrap();
        assert_eq!(courses.len(), 2);
        assert!(courses.contains("sql-101"));

        assert!(store.enrolled_course_ids("m-2").await.unwrap().is_empty());
    }
}
