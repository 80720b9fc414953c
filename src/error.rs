//! Error types for stock-nl2sql.
//!
//! Defines the main error enum used throughout the crate.

use thiserror::Error;

use crate::intent::{Intent, Param};

/// Main error type for translation and execution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Nl2SqlError {
    /// No classification rule matched the question.
    #[error("Unrecognized question: '{question}'")]
    UnrecognizedIntent { question: String },

    /// A template placeholder could not be resolved and has no default.
    #[error("Missing parameter '{name}' for {intent}")]
    MissingParameter { intent: Intent, name: Param },

    /// An extracted value failed validation against its allow-set or range.
    #[error("Invalid value '{value}' for parameter '{name}'")]
    InvalidParameterValue { name: Param, value: String },

    /// Generated SQL did not pass the read-only guard.
    #[error("Unsafe SQL: {0}")]
    UnsafeSql(String),

    /// Database connection errors (missing file, permissions, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution errors (missing table, timeouts, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Configuration errors (invalid config file, bad ticker entries, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Nl2SqlError {
    /// Creates an unrecognized-intent error echoing the question.
    pub fn unrecognized(question: impl Into<String>) -> Self {
        Self::UnrecognizedIntent {
            question: question.into(),
        }
    }

    /// Creates a missing-parameter error.
    pub fn missing(intent: Intent, name: Param) -> Self {
        Self::MissingParameter { intent, name }
    }

    /// Creates an invalid-parameter error.
    pub fn invalid(name: Param, value: impl Into<String>) -> Self {
        Self::InvalidParameterValue {
            name,
            value: value.into(),
        }
    }

    /// Creates an unsafe-SQL error with the given message.
    pub fn unsafe_sql(msg: impl Into<String>) -> Self {
        Self::UnsafeSql(msg.into())
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnrecognizedIntent { .. } => "Unrecognized Question",
            Self::MissingParameter { .. } => "Missing Parameter",
            Self::InvalidParameterValue { .. } => "Invalid Parameter",
            Self::UnsafeSql(_) => "Unsafe SQL",
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns true for failures caused by the question itself rather than
    /// the environment.
    pub fn is_translation_error(&self) -> bool {
        matches!(
            self,
            Self::UnrecognizedIntent { .. }
                | Self::MissingParameter { .. }
                | Self::InvalidParameterValue { .. }
        )
    }
}

/// Result type alias using Nl2SqlError.
pub type Result<T> = std::result::Result<T, Nl2SqlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unrecognized() {
        let err = Nl2SqlError::unrecognized("asdkjasd");
        assert_eq!(err.to_string(), "Unrecognized question: 'asdkjasd'");
        assert_eq!(err.category(), "Unrecognized Question");
        assert!(err.is_translation_error());
    }

    #[test]
    fn test_error_display_missing_parameter() {
        let err = Nl2SqlError::missing(Intent::MovingAverage, Param::Ticker);
        assert_eq!(
            err.to_string(),
            "Missing parameter 'ticker' for moving_average"
        );
        assert_eq!(err.category(), "Missing Parameter");
    }

    #[test]
    fn test_error_display_invalid_parameter() {
        let err = Nl2SqlError::invalid(Param::Ticker, "TSLA");
        assert_eq!(err.to_string(), "Invalid value 'TSLA' for parameter 'ticker'");
        assert_eq!(err.category(), "Invalid Parameter");
    }

    #[test]
    fn test_error_display_query() {
        let err = Nl2SqlError::query("no such table: stock_prices");
        assert_eq!(err.to_string(), "Query error: no such table: stock_prices");
        assert_eq!(err.category(), "Query Error");
        assert!(!err.is_translation_error());
    }

    #[test]
    fn test_error_display_config() {
        let err = Nl2SqlError::config("duplicate ticker 'AAPL'");
        assert_eq!(
            err.to_string(),
            "Configuration error: duplicate ticker 'AAPL'"
        );
        assert_eq!(err.category(), "Configuration Error");
    }

    #[test]
    fn test_error_display_unsafe_sql() {
        let err = Nl2SqlError::unsafe_sql("DELETE statements are not allowed");
        assert_eq!(
            err.to_string(),
            "Unsafe SQL: DELETE statements are not allowed"
        );
        assert_eq!(err.category(), "Unsafe SQL");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Nl2SqlError>();
    }
}
