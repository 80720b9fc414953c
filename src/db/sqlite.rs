//! SQLite database client implementation.
//!
//! Provides the `SqliteClient` struct that implements the `DatabaseClient`
//! trait over a read-only sqlx pool.

use crate::config::DatabaseConfig;
use crate::db::{ColumnInfo, DatabaseClient, QueryResult, Row, Value};
use crate::error::{Nl2SqlError, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column as SqlxColumn, Executor, Row as SqlxRow, TypeInfo, ValueRef};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// SQLite database client.
#[derive(Debug)]
pub struct SqliteClient {
    pool: SqlitePool,
    max_rows: usize,
    query_timeout: Duration,
}

impl SqliteClient {
    /// Opens the dataset file read-only. The file must already exist.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let path = config.path.as_path();
        if !path.exists() {
            return Err(Nl2SqlError::connection(format!(
                "Dataset '{}' does not exist. Load the price data first.",
                path.display()
            )));
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(|e| map_connection_error(e, path))?;

        debug!("Opened dataset {}", path.display());
        Ok(Self::from_pool(pool).with_limits(config.max_rows, config.query_timeout()))
    }

    /// Creates a client from an existing pool, e.g. an in-memory fixture.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            max_rows: DatabaseConfig::DEFAULT_MAX_ROWS,
            query_timeout: Duration::from_secs(DatabaseConfig::DEFAULT_QUERY_TIMEOUT_SECS),
        }
    }

    /// Sets the row cap and per-query timeout.
    pub fn with_limits(mut self, max_rows: usize, query_timeout: Duration) -> Self {
        self.max_rows = max_rows;
        self.query_timeout = query_timeout;
        self
    }

    /// Column metadata for a query that returned no rows.
    async fn fetch_column_metadata(&self, sql: &str) -> Result<Vec<ColumnInfo>> {
        let describe = (&self.pool)
            .describe(sql)
            .await
            .map_err(|e| Nl2SqlError::query(format_query_error(e)))?;

        Ok(describe
            .columns()
            .iter()
            .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
            .collect())
    }
}

#[async_trait]
impl DatabaseClient for SqliteClient {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        let start = Instant::now();

        let result = tokio::time::timeout(self.query_timeout, sqlx::query(sql).fetch_all(&self.pool))
            .await
            .map_err(|_| {
                Nl2SqlError::query(format!(
                    "Query timed out after {} seconds",
                    self.query_timeout.as_secs()
                ))
            })?
            .map_err(|e| Nl2SqlError::query(format_query_error(e)))?;

        let execution_time = start.elapsed();

        let columns: Vec<ColumnInfo> = match result.first() {
            Some(first_row) => first_row
                .columns()
                .iter()
                .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
                .collect(),
            None => match self.fetch_column_metadata(sql).await {
                Ok(columns) => columns,
                Err(e) => {
                    debug!("No column metadata for empty result: {e}");
                    Vec::new()
                }
            },
        };

        let total_rows = result.len();
        let was_truncated = total_rows > self.max_rows;
        if was_truncated {
            warn!(
                "Query returned {} rows, truncating to {} rows",
                total_rows, self.max_rows
            );
        }

        let rows: Vec<Row> = result.iter().take(self.max_rows).map(convert_row).collect();
        let row_count = rows.len();

        Ok(QueryResult {
            columns,
            rows,
            execution_time,
            row_count,
            total_rows,
            was_truncated,
        })
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// Converts a sqlx SqliteRow to our Row type.
fn convert_row(row: &SqliteRow) -> Row {
    (0..row.len()).map(|i| convert_value(row, i)).collect()
}

/// Converts one cell using the storage class of the stored value, since
/// SQLite columns are dynamically typed and expressions have no declared type.
fn convert_value(row: &SqliteRow, index: usize) -> Value {
    let type_name = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_ascii_uppercase(),
        Err(_) => return Value::Null,
    };

    match type_name.as_str() {
        "INTEGER" | "INT" | "BIGINT" => row
            .try_get_unchecked::<i64, _>(index)
            .map(Value::Int)
            .unwrap_or(Value::Null),

        "REAL" | "FLOAT" | "DOUBLE" | "NUMERIC" => row
            .try_get_unchecked::<f64, _>(index)
            .map(Value::Float)
            .unwrap_or(Value::Null),

        "BOOLEAN" => row
            .try_get_unchecked::<bool, _>(index)
            .map(Value::Bool)
            .unwrap_or(Value::Null),

        "BLOB" => row
            .try_get_unchecked::<Vec<u8>, _>(index)
            .map(Value::Bytes)
            .unwrap_or(Value::Null),

        // TEXT, DATE, DATETIME and anything else print as text.
        _ => row
            .try_get_unchecked::<String, _>(index)
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}

/// Maps sqlx open errors to user-facing messages.
fn map_connection_error(error: sqlx::Error, path: &Path) -> Nl2SqlError {
    let error_str = error.to_string().to_lowercase();

    if error_str.contains("unable to open") || error_str.contains("cannot open") {
        Nl2SqlError::connection(format!("Cannot open dataset '{}'.", path.display()))
    } else if error_str.contains("not a database") || error_str.contains("file is encrypted") {
        Nl2SqlError::connection(format!(
            "'{}' is not a SQLite database.",
            path.display()
        ))
    } else {
        Nl2SqlError::connection(error.to_string())
    }
}

/// Formats a query error, preferring the database's own message.
fn format_query_error(error: sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => format!("ERROR: {}", db_error.message()),
        None => error.to_string(),
    }
}
