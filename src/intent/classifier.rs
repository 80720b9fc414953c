//! Rule-based intent classifier.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::debug;

use super::rules::{first_match, Rule, RULES};
use super::{Intent, Param, ParameterSet, TickerSet};
use crate::error::{Nl2SqlError, Result};

/// Window size used when a moving-average question names none.
pub const DEFAULT_WINDOW: u32 = 7;

/// "7 day", "7-day", "30 days", "7day".
static WINDOW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)\s*-?\s*days?\b").expect("window pattern is valid")
});

/// Upper-case words that look like symbols but are ordinary finance jargon,
/// exchange or index names.
const NOT_TICKERS: &[&str] = &[
    "SQL", "SMA", "EMA", "MA", "AVG", "USD", "ETF", "CEO", "CFO", "IPO", "EPS", "PE", "YTD",
    "API", "US", "OK", "ALL", "NYSE", "NASDAQ", "AMEX", "SPX", "DJIA", "CSV",
];

/// Outcome of classifying a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub intent: Intent,
    pub params: ParameterSet,
    /// The keyword that selected the rule.
    pub matched_keyword: &'static str,
}

/// Maps questions to intents using an ordered rule list.
///
/// Holds only immutable data, so one instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    rules: &'static [Rule],
    tickers: Arc<TickerSet>,
    default_window: u32,
    default_ticker: Option<String>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new(Arc::new(TickerSet::default()))
    }
}

impl IntentClassifier {
    /// Creates a classifier over the built-in rules.
    pub fn new(tickers: Arc<TickerSet>) -> Self {
        Self {
            rules: RULES,
            tickers,
            default_window: DEFAULT_WINDOW,
            default_ticker: None,
        }
    }

    /// Sets the window used when the question names none.
    pub fn with_default_window(mut self, window: u32) -> Self {
        self.default_window = window;
        self
    }

    /// Sets the ticker used for single-ticker intents when the question
    /// names none. Without one, such questions fail at binding time.
    pub fn with_default_ticker(mut self, ticker: Option<String>) -> Self {
        self.default_ticker = ticker;
        self
    }

    /// Classifies a question. Any string is valid input; questions that no
    /// rule matches yield `UnrecognizedIntent`.
    pub fn classify(&self, question: &str) -> Result<Classification> {
        let trimmed = question.trim();
        if trimmed.is_empty() {
            return Err(Nl2SqlError::unrecognized(question));
        }

        let ticker = self.extract_ticker(trimmed);
        let lower = trimmed.to_lowercase();

        let Some((rule, keyword)) = first_match(self.rules, &lower, ticker.is_some()) else {
            debug!("No rule matched question: {trimmed}");
            return Err(Nl2SqlError::unrecognized(question));
        };
        let intent = rule.intent;

        let mut params = ParameterSet::new();
        if intent.requires_ticker() {
            if let Some(ticker) = ticker.or_else(|| self.default_ticker.clone()) {
                params.insert(Param::Ticker, ticker);
            }
        }
        if intent.uses_window() {
            let window = extract_window(trimmed).unwrap_or_else(|| self.default_window.to_string());
            params.insert(Param::Window, window);
        }

        debug!("Matched '{keyword}' -> {intent} {params}");
        Ok(Classification {
            intent,
            params,
            matched_keyword: keyword,
        })
    }

    /// Finds the ticker a question refers to.
    ///
    /// The first token naming a known ticker (symbol or alias) wins. If none
    /// does, the first symbol-like upper-case word is returned verbatim so
    /// that the binder can reject it rather than widening the query.
    pub fn extract_ticker(&self, question: &str) -> Option<String> {
        let tokens: Vec<&str> = question
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();

        if let Some(symbol) = tokens.iter().find_map(|t| self.tickers.resolve(t)) {
            return Some(symbol.to_string());
        }

        // A shouted question has no usable case signal.
        if !question.chars().any(|c| c.is_lowercase()) {
            return None;
        }

        tokens
            .into_iter()
            .find(|t| looks_like_symbol(t))
            .map(str::to_string)
    }
}

/// Extracts the first "<N> day" window from a question, as written.
pub fn extract_window(question: &str) -> Option<String> {
    WINDOW_RE
        .captures(question)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Every distinct "<N> day" window in a question, in order of appearance.
pub fn extract_windows(question: &str) -> Vec<String> {
    let mut windows: Vec<String> = Vec::new();
    for caps in WINDOW_RE.captures_iter(question) {
        let window = caps[1].to_string();
        if !windows.contains(&window) {
            windows.push(window);
        }
    }
    windows
}

fn looks_like_symbol(token: &str) -> bool {
    (2..=5).contains(&token.len())
        && token.chars().all(|c| c.is_ascii_uppercase())
        && !NOT_TICKERS.contains(&token)
}
