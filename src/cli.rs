//! Command-line argument parsing.

use crate::config::Config;
use crate::output::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

/// Questions asked by `--demo`.
pub const DEMO_QUESTIONS: [&str; 5] = [
    "What is the average price of Apple stock?",
    "Show me the 7-day and 30-day moving averages for Apple",
    "Which stock is most volatile?",
    "Show me risk metrics for all stocks",
    "What are the daily returns for the last 30 days?",
];

/// Answers plain-English questions about stock prices with SQL.
#[derive(Parser, Debug)]
#[command(name = "nl2sql")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Question to answer. Without one, questions are read from stdin, one per line.
    #[arg(value_name = "QUESTION")]
    pub question: Option<String>,

    /// Run the built-in demo questions
    #[arg(long, conflicts_with = "question")]
    pub demo: bool,

    /// Print the generated SQL without executing it
    #[arg(long)]
    pub sql_only: bool,

    /// SQLite dataset holding the stock_prices table
    #[arg(short = 'd', long, value_name = "PATH", env = "NL2SQL_DATABASE")]
    pub database: Option<PathBuf>,

    /// Config file path
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format: text or json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub output: String,

    /// Write logs to the log file instead of stderr
    #[arg(long)]
    pub log_file: bool,
}

/// Where the questions of a run come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionSource {
    Single(String),
    Demo,
    Stdin,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Parses the output format from the --output argument.
    pub fn parse_output_format(&self) -> std::result::Result<OutputFormat, String> {
        self.output.parse()
    }

    pub fn question_source(&self) -> QuestionSource {
        match (&self.question, self.demo) {
            (Some(question), _) => QuestionSource::Single(question.clone()),
            (None, true) => QuestionSource::Demo,
            (None, false) => QuestionSource::Stdin,
        }
    }

    /// Overrides the configured dataset path if one was given on the
    /// command line or through `NL2SQL_DATABASE`.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(path) = &self.database {
            config.database.path = path.clone();
        }
    }
}
