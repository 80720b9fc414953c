//! Read-only guard for generated SQL.
//!
//! Parses SQL and classifies it as safe, mutating, or destructive. Only a
//! single safe statement is ever handed to the database.

mod parser;

pub use parser::{classify_sql, ensure_read_only};

use std::fmt;

/// Safety level classification for SQL queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SafetyLevel {
    /// Read-only queries (SELECT, WITH ... SELECT).
    Safe,
    /// Data modification (INSERT, UPDATE).
    Mutating,
    /// Data loss, schema changes, or anything unrecognized.
    Destructive,
}

impl fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => write!(f, "Safe"),
            Self::Mutating => write!(f, "Mutating"),
            Self::Destructive => write!(f, "Destructive"),
        }
    }
}

/// The type of SQL statement detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementType {
    Select,
    /// Query with common table expressions.
    With,
    /// Any other statement, named by its leading keyword.
    Other(String),
    /// Multiple statements detected; contains the most dangerous type.
    Multiple(Box<StatementType>),
    /// Statement type could not be determined.
    Unknown,
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select => write!(f, "SELECT"),
            Self::With => write!(f, "WITH (CTE)"),
            Self::Other(keyword) => write!(f, "{keyword}"),
            Self::Multiple(inner) => write!(f, "Multiple ({})", inner),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Result of classifying a SQL query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    /// The determined safety level.
    pub level: SafetyLevel,
    /// The type of statement(s) detected.
    pub statement_type: StatementType,
    /// Why the query is not safe, if it isn't.
    pub warning: Option<String>,
}

impl ClassificationResult {
    pub fn new(level: SafetyLevel, statement_type: StatementType) -> Self {
        Self {
            level,
            statement_type,
            warning: None,
        }
    }

    pub fn with_warning(
        level: SafetyLevel,
        statement_type: StatementType,
        warning: impl Into<String>,
    ) -> Self {
        Self {
            level,
            statement_type,
            warning: Some(warning.into()),
        }
    }

    pub fn is_safe(&self) -> bool {
        self.level == SafetyLevel::Safe
    }
}
