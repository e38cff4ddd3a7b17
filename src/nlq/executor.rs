use std::sync::Arc;

use tracing::debug;

use crate::db::{DatabaseError, QueryStore, ResultSet};

use super::error::QueryError;
use super::statement::SqlQuery;

/// Runs an already-validated SELECT and fetches every row. Zero rows
/// are reported through the error channel, like any other failure.
pub struct QueryExecutor {
    store: Arc<dyn QueryStore>,
}

impl QueryExecutor {
    pub fn new(store: Arc<dyn QueryStore>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, query: &SqlQuery) -> Result<ResultSet, QueryError> {
        let result = self
            .store
            .select(&query.sql, &query.params)
            .await
            .map_err(|e| match e {
                DatabaseError::Query(message) => QueryError::Sql(message),
                other => QueryError::Sql(other.to_string()),
            })?;

        if result.is_empty() {
            return Err(QueryError::NoResults);
        }

        debug!(rows = result.rows.len(), "query executed");
        Ok(result)
    }
}
