use std::sync::Arc;

use rusqlite::params;
use tracing::{info, warn};

use crate::config::DatabaseConfig;

use super::DatabaseError;
use super::schema;
use super::sqlite::{SqliteQueryStore, open_connection};
use super::stores::QueryStore;

#[derive(Clone)]
pub struct DatabaseManager {
    db_path: Arc<String>,
    query_store: Arc<dyn QueryStore>,
}

impl DatabaseManager {
    pub fn new(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        if config.filename.is_empty() {
            return Err(DatabaseError::Connection(
                "database filename is not configured".to_string(),
            ));
        }

        let db_path = Arc::new(config.filename.clone());
        let query_store = Arc::new(SqliteQueryStore::new(db_path.clone()));

        Ok(Self {
            db_path,
            query_store,
        })
    }

    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        let db_path = self.db_path.clone();

        tokio::task::spawn_blocking(move || {
            let conn = open_connection(&db_path)?;

            for statement in schema::CREATE_TABLES {
                conn.execute(statement, [])
                    .map_err(|e| DatabaseError::Migration(e.to_string()))?;
            }

            Ok(())
        })
        .await
        .map_err(|e| DatabaseError::Migration(format!("migration task failed: {e}")))?
    }

    /// Insert the bootstrap rows. A failed insert (e.g. a duplicate key
    /// after a restart) is logged and skipped, never fatal.
    pub async fn seed(&self) -> Result<(), DatabaseError> {
        let db_path = self.db_path.clone();
        info!(path = %self.db_path, "seeding database");

        tokio::task::spawn_blocking(move || {
            let conn = open_connection(&db_path)?;

            for employee in schema::seed_employees() {
                let inserted = conn.execute(
                    "INSERT INTO employees (id, name, department, salary, hire_date)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        employee.id,
                        employee.name,
                        employee.department,
                        employee.salary,
                        employee.hire_date,
                    ],
                );
                if let Err(err) = inserted {
                    warn!(id = employee.id, "skipping employee seed row: {err}");
                }
            }

            for department in schema::seed_departments() {
                let inserted = conn.execute(
                    "INSERT INTO departments (id, name, manager) VALUES (?1, ?2, ?3)",
                    params![department.id, department.name, department.manager],
                );
                if let Err(err) = inserted {
                    warn!(id = department.id, "skipping department seed row: {err}");
                }
            }

            Ok(())
        })
        .await
        .map_err(|e| DatabaseError::Migration(format!("seed task failed: {e}")))?
    }

    pub fn query_store(&self) -> Arc<dyn QueryStore> {
        self.query_store.clone()
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }
}
