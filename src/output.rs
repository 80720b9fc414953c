//! Output formatting for answered questions.
//!
//! Provides two formats: a human-readable text layout with a result table,
//! and JSON for scripting.

use serde::Serialize;

use crate::db::QueryResult;
use crate::error::Nl2SqlError;
use crate::intent::{extract_windows, ChartKind, Intent, Param, ParameterSet};
use crate::query::{HistoryEntry, QueryHistory};
use crate::template::BoundQuery;

/// Output format for the command-line shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Plain text with a result table.
    #[default]
    Text,
    /// One pretty-printed JSON document per answer.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {s}. Expected: text or json")),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonAnswer<'a> {
    question: &'a str,
    intent: Intent,
    params: &'a ParameterSet,
    sql: &'a str,
    explanation: &'a str,
    chart: ChartKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a QueryResult>,
}

#[derive(Debug, Serialize)]
struct JsonError<'a> {
    question: &'a str,
    category: &'static str,
    error: String,
}

#[derive(Debug, Serialize)]
struct JsonSummary<'a> {
    history: &'a [HistoryEntry],
}

/// Formats answers, errors and the session summary.
pub struct AnswerFormatter {
    format: OutputFormat,
}

impl AnswerFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a translated question, with its result if it was executed.
    pub fn format_answer(
        &self,
        question: &str,
        query: &BoundQuery,
        result: Option<&QueryResult>,
    ) -> String {
        match self.format {
            OutputFormat::Text => format_answer_text(question, query, result),
            OutputFormat::Json => to_json(&JsonAnswer {
                question,
                intent: query.intent,
                params: &query.params,
                sql: &query.sql,
                explanation: &query.explanation,
                chart: query.chart_kind(),
                note: window_note(question, query),
                result,
            }),
        }
    }

    /// Formats a failed question.
    pub fn format_error(&self, question: &str, error: &Nl2SqlError) -> String {
        match self.format {
            OutputFormat::Text => format!(
                "Question: {question}\n{}: {error}\n",
                error.category()
            ),
            OutputFormat::Json => to_json(&JsonError {
                question,
                category: error.category(),
                error: error.to_string(),
            }),
        }
    }

    /// Formats the history of a multi-question run.
    pub fn format_summary(&self, history: &QueryHistory) -> String {
        match self.format {
            OutputFormat::Text => format_summary_text(history),
            OutputFormat::Json => to_json(&JsonSummary {
                history: history.entries(),
            }),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    let mut out = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize: {}\"}}", e));
    out.push('\n');
    out
}

/// Points out windows named in the question that the query does not compute.
/// Only the first window is bound, so "7-day and 30-day" yields `ma_7` alone.
fn window_note(question: &str, query: &BoundQuery) -> Option<String> {
    let bound = query.params.get(Param::Window)?;
    let skipped: Vec<String> = extract_windows(question)
        .into_iter()
        .filter(|w| w != bound)
        .map(|w| format!("{w}-day"))
        .collect();
    if skipped.is_empty() {
        return None;
    }
    Some(format!(
        "only the {bound}-day window is computed; ask again for the {} window",
        skipped.join(", ")
    ))
}

fn format_answer_text(question: &str, query: &BoundQuery, result: Option<&QueryResult>) -> String {
    let mut out = format!(
        "Question: {question}\nSQL: {}\nExplanation: {}\nChart: {}\n",
        query.sql,
        query.explanation,
        query.chart_kind()
    );
    if let Some(note) = window_note(question, query) {
        out.push_str(&format!("Note: {note}\n"));
    }

    if let Some(result) = result {
        out.push('\n');
        let headers: Vec<String> = result.columns.iter().map(|c| c.name.clone()).collect();
        let rows: Vec<Vec<String>> = result
            .rows
            .iter()
            .map(|row| row.iter().map(|v| v.to_display_string()).collect())
            .collect();
        let table = format_table(&headers, &rows);
        if !table.is_empty() {
            out.push_str(&table);
            out.push('\n');
        }

        let noun = if result.row_count == 1 { "row" } else { "rows" };
        out.push_str(&format!(
            "({} {noun} in {}ms)\n",
            result.row_count,
            result.execution_time.as_millis()
        ));
        if let Some(warning) = result.truncation_warning() {
            out.push_str(&warning);
            out.push('\n');
        }
    }

    out
}

fn format_summary_text(history: &QueryHistory) -> String {
    let mut out = format!("Query history ({} questions):\n", history.len());
    for (i, entry) in history.entries().iter().enumerate() {
        let rows = match entry.rows {
            Some(n) => format!("{n} rows"),
            None => "not executed".to_string(),
        };
        out.push_str(&format!("{:>3}. {} [{rows}]\n", i + 1, entry.question));
    }
    out
}

/// Lays out a table with aligned columns.
fn format_table(headers: &[String], rows: &[Vec<String>]) -> String {
    if headers.is_empty() {
        return String::new();
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let mut output = String::new();

    let header_line: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
        .collect();
    output.push_str(&header_line.join(" │ "));
    output.push('\n');

    let separator: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    output.push_str(&separator.join("─┼─"));
    output.push('\n');

    for row in rows {
        let row_line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let width = widths.get(i).copied().unwrap_or(cell.len());
                format!("{:width$}", cell, width = width)
            })
            .collect();
        output.push_str(row_line.join(" │ ").trim_end());
        output.push('\n');
    }

    output.trim_end().to_string()
}
