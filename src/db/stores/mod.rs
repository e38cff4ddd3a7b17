use async_trait::async_trait;
use serde_json::Value;

use super::DatabaseError;

/// All rows of a SELECT, decoded to JSON values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
pub trait QueryStore: Send + Sync {
    /// Run a SELECT with positional text parameters and fetch every row.
    async fn select(&self, sql: &str, params: &[String]) -> Result<ResultSet, DatabaseError>;

    /// Existence probe for a value in a (table, column) pair. The pair
    /// must come from the static rule table, never from user input.
    async fn value_exists(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<bool, DatabaseError>;
}
