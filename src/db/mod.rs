//! Database access for executing generated queries.
//!
//! The dataset is an external collaborator: this module opens it read-only
//! and runs queries, but never creates or migrates the schema.

mod sqlite;
mod types;

pub use sqlite::SqliteClient;
pub use types::{ColumnInfo, QueryResult, Row, Value};

use crate::config::DatabaseConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Opens the configured dataset.
pub async fn connect(config: &DatabaseConfig) -> Result<Box<dyn DatabaseClient>> {
    let client = SqliteClient::connect(config).await?;
    Ok(Box::new(client))
}

/// Interface for database clients.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Executes a SQL query and returns the results.
    async fn execute_query(&self, sql: &str) -> Result<QueryResult>;

    /// Closes the database connection.
    async fn close(&self) -> Result<()>;
}
