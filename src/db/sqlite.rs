use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;

use super::DatabaseError;
use super::stores::{QueryStore, ResultSet};

/// SQLite-backed store. Every call opens a fresh connection on the
/// blocking pool and releases it when the closure returns.
pub struct SqliteQueryStore {
    db_path: Arc<String>,
}

impl SqliteQueryStore {
    pub fn new(db_path: Arc<String>) -> Self {
        Self { db_path }
    }
}

pub(crate) fn open_connection(path: &str) -> Result<Connection, DatabaseError> {
    Connection::open(path).map_err(|e| DatabaseError::Connection(e.to_string()))
}

fn decode_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::from(n),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::from(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(_) => Value::from("[blob]"),
    }
}

#[async_trait]
impl QueryStore for SqliteQueryStore {
    async fn select(&self, sql: &str, params: &[String]) -> Result<ResultSet, DatabaseError> {
        let sql = sql.to_string();
        let params = params.to_vec();
        let db_path = self.db_path.clone();

        tokio::task::spawn_blocking(move || {
            let conn = open_connection(&db_path)?;
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| DatabaseError::Query(e.to_string()))?;

            let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

            let mut rows = stmt
                .query(rusqlite::params_from_iter(params.iter()))
                .map_err(|e| DatabaseError::Query(e.to_string()))?;

            let mut decoded = Vec::new();
            while let Some(row) = rows
                .next()
                .map_err(|e| DatabaseError::Query(e.to_string()))?
            {
                let mut cells = Vec::with_capacity(columns.len());
                for index in 0..columns.len() {
                    let cell = row
                        .get_ref(index)
                        .map_err(|e| DatabaseError::Query(e.to_string()))?;
                    cells.push(decode_value(cell));
                }
                decoded.push(cells);
            }

            Ok(ResultSet {
                columns,
                rows: decoded,
            })
        })
        .await
        .map_err(|e| DatabaseError::Query(format!("query task failed: {e}")))?
    }

    async fn value_exists(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<bool, DatabaseError> {
        // table and column are trusted rule-table identifiers; only the
        // value is bound.
        let probe = format!("SELECT 1 FROM {table} WHERE {column} = ?1 COLLATE NOCASE LIMIT 1");
        let value = value.to_string();
        let db_path = self.db_path.clone();

        tokio::task::spawn_blocking(move || {
            let conn = open_connection(&db_path)?;
            let hit = conn
                .query_row(&probe, rusqlite::params![value], |_| Ok(()))
                .optional()
                .map_err(|e| DatabaseError::Query(e.to_string()))?;
            Ok(hit.is_some())
        })
        .await
        .map_err(|e| DatabaseError::Query(format!("query task failed: {e}")))?
    }
}
