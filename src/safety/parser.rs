//! SQL parsing and classification logic.
//!
//! Uses sqlparser-rs with the SQLite dialect, matching the database the
//! generated queries run against.

use sqlparser::ast::{Query, Select, SetExpr, Statement, TableFactor, TableWithJoins};
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;
use tracing::warn;

use crate::error::{Nl2SqlError, Result};

use super::{ClassificationResult, SafetyLevel, StatementType};

/// SQL classifier that parses and classifies SQL queries.
#[derive(Debug)]
pub struct SqlClassifier {
    dialect: SQLiteDialect,
}

impl Default for SqlClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlClassifier {
    pub fn new() -> Self {
        Self {
            dialect: SQLiteDialect {},
        }
    }

    /// Classifies a SQL string.
    ///
    /// SQL that cannot be parsed is treated as destructive.
    pub fn classify(&self, sql: &str) -> ClassificationResult {
        match self.parse_and_classify(sql) {
            Ok(result) => result,
            Err(e) => ClassificationResult::with_warning(
                SafetyLevel::Destructive,
                StatementType::Unknown,
                format!("Could not parse SQL: {e}"),
            ),
        }
    }

    fn parse_and_classify(&self, sql: &str) -> Result<ClassificationResult> {
        let statements = Parser::parse_sql(&self.dialect, sql)
            .map_err(|e| Nl2SqlError::query(format!("SQL parse error: {e}")))?;

        match statements.as_slice() {
            [] => Ok(ClassificationResult::with_warning(
                SafetyLevel::Destructive,
                StatementType::Unknown,
                "Empty SQL statement",
            )),
            [statement] => {
                let (level, stmt_type) = classify_statement(statement);
                Ok(finish(level, stmt_type))
            }
            many => {
                // Most dangerous statement wins; more than one is never safe.
                let (level, stmt_type) = many
                    .iter()
                    .map(classify_statement)
                    .max_by_key(|(level, _)| *level)
                    .unwrap_or((SafetyLevel::Destructive, StatementType::Unknown));
                Ok(ClassificationResult::with_warning(
                    level.max(SafetyLevel::Mutating),
                    StatementType::Multiple(Box::new(stmt_type)),
                    format!("{} statements in one query", many.len()),
                ))
            }
        }
    }
}

fn finish(level: SafetyLevel, stmt_type: StatementType) -> ClassificationResult {
    match level {
        SafetyLevel::Safe => ClassificationResult::new(level, stmt_type),
        SafetyLevel::Mutating => {
            ClassificationResult::with_warning(level, stmt_type, "This query modifies data.")
        }
        SafetyLevel::Destructive => {
            ClassificationResult::with_warning(level, stmt_type, "This action cannot be undone.")
        }
    }
}

/// Convenience function to classify SQL without creating a classifier instance.
pub fn classify_sql(sql: &str) -> ClassificationResult {
    SqlClassifier::new().classify(sql)
}

/// Fails with `UnsafeSql` unless `sql` is a single read-only statement.
pub fn ensure_read_only(sql: &str) -> Result<ClassificationResult> {
    let result = classify_sql(sql);
    if result.is_safe() {
        return Ok(result);
    }

    warn!("Refusing {} query ({}): {sql}", result.level, result.statement_type);
    let reason = result
        .warning
        .clone()
        .unwrap_or_else(|| "query is not read-only".to_string());
    Err(Nl2SqlError::unsafe_sql(format!(
        "{} query rejected: {reason}",
        result.statement_type
    )))
}

/// Classifies a single parsed statement.
fn classify_statement(statement: &Statement) -> (SafetyLevel, StatementType) {
    match statement {
        Statement::Query(query) => classify_query(query),
        other => {
            let keyword = leading_keyword(other);
            let level = match keyword.as_str() {
                "INSERT" | "UPDATE" | "REPLACE" | "MERGE" => SafetyLevel::Mutating,
                _ => SafetyLevel::Destructive,
            };
            (level, StatementType::Other(keyword))
        }
    }
}

fn leading_keyword(statement: &Statement) -> String {
    statement
        .to_string()
        .split_whitespace()
        .next()
        .map(str::to_ascii_uppercase)
        .unwrap_or_default()
}

/// Classifies a Query, including its CTEs. Returns the most dangerous
/// (SafetyLevel, StatementType) found.
fn classify_query(query: &Query) -> (SafetyLevel, StatementType) {
    let mut max_level = SafetyLevel::Safe;
    let mut max_type = StatementType::Select;

    if let Some(with) = &query.with {
        max_type = StatementType::With;
        for cte in &with.cte_tables {
            let (level, stmt_type) = classify_query(&cte.query);
            if level > max_level {
                max_level = level;
                max_type = stmt_type;
            }
        }
    }

    let (body_level, body_type) = classify_set_expr(&query.body);
    if body_level > max_level {
        max_level = body_level;
        max_type = body_type;
    }

    (max_level, max_type)
}

/// Classifies a SetExpr, detecting mutations and recursing into nested queries.
fn classify_set_expr(set_expr: &SetExpr) -> (SafetyLevel, StatementType) {
    match set_expr {
        SetExpr::Select(select) => classify_select(select),
        SetExpr::Query(query) => classify_query(query),
        SetExpr::SetOperation { left, right, .. } => {
            let left = classify_set_expr(left);
            let right = classify_set_expr(right);
            if left.0 >= right.0 {
                left
            } else {
                right
            }
        }
        SetExpr::Values(_) | SetExpr::Table(_) => (SafetyLevel::Safe, StatementType::Select),
        SetExpr::Insert(stmt) | SetExpr::Update(stmt) => classify_statement(stmt),
        #[allow(unreachable_patterns)]
        _ => (SafetyLevel::Destructive, StatementType::Unknown),
    }
}

/// Classifies a Select by checking its FROM clause for subqueries.
fn classify_select(select: &Select) -> (SafetyLevel, StatementType) {
    select
        .from
        .iter()
        .map(classify_table_with_joins)
        .fold((SafetyLevel::Safe, StatementType::Select), max_by_level)
}

/// Classifies a TableWithJoins, checking the main relation and all joins.
fn classify_table_with_joins(twj: &TableWithJoins) -> (SafetyLevel, StatementType) {
    std::iter::once(&twj.relation)
        .chain(twj.joins.iter().map(|join| &join.relation))
        .map(classify_table_factor)
        .fold((SafetyLevel::Safe, StatementType::Select), max_by_level)
}

/// Classifies a TableFactor, recursing into derived tables (subqueries).
fn classify_table_factor(factor: &TableFactor) -> (SafetyLevel, StatementType) {
    match factor {
        TableFactor::Derived { subquery, .. } => classify_query(subquery),
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => classify_table_with_joins(table_with_joins),
        _ => (SafetyLevel::Safe, StatementType::Select),
    }
}

fn max_by_level(
    acc: (SafetyLevel, StatementType),
    next: (SafetyLevel, StatementType),
) -> (SafetyLevel, StatementType) {
    if next.0 > acc.0 {
        next
    } else {
        acc
    }
}
