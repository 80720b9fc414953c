//! Query execution behind the read-only guard.
//!
//! Generated SQL is classified before it reaches the database, so a template
//! that somehow produced a write would fail here instead of running.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::info;

use crate::db::{DatabaseClient, QueryResult};
use crate::error::Result;
use crate::safety::ensure_read_only;
use crate::template::BoundQuery;

/// Runs bound queries against a database client.
pub struct QueryExecutor<'a> {
    db: &'a dyn DatabaseClient,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(db: &'a dyn DatabaseClient) -> Self {
        Self { db }
    }

    /// Checks the query is a single read-only statement, then executes it.
    pub async fn execute(&self, query: BoundQuery) -> Result<QueryOutcome> {
        ensure_read_only(&query.sql)?;

        let start = Instant::now();
        let result = self.db.execute_query(&query.sql).await?;
        let execution_time = start.elapsed();

        info!(
            "Executed {} in {} ms ({} rows)",
            query.intent,
            execution_time.as_millis(),
            result.row_count
        );

        Ok(QueryOutcome {
            query,
            result,
            execution_time,
        })
    }
}

/// Successful query execution outcome.
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    /// The SQL that ran and where it came from.
    pub query: BoundQuery,
    /// The query result.
    pub result: QueryResult,
    /// Wall-clock time including the guard.
    #[serde(skip)]
    pub execution_time: Duration,
}
