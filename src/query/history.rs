//! In-memory record of the questions asked in a session.

use serde::Serialize;

use super::QueryOutcome;

/// One answered question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub question: String,
    pub sql: String,
    /// Rows returned, or `None` when the query was not executed.
    pub rows: Option<usize>,
}

/// Questions asked so far, oldest first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryHistory {
    entries: Vec<HistoryEntry>,
}

impl QueryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a translated but unexecuted question.
    pub fn record_translation(&mut self, question: &str, sql: &str) {
        self.entries.push(HistoryEntry {
            question: question.to_string(),
            sql: sql.to_string(),
            rows: None,
        });
    }

    /// Records an executed question.
    pub fn record(&mut self, question: &str, outcome: &QueryOutcome) {
        self.entries.push(HistoryEntry {
            question: question.to_string(),
            sql: outcome.query.sql.clone(),
            rows: Some(outcome.result.row_count),
        });
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
