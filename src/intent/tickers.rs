//! The ticker allow-set.
//!
//! Built once from configuration and shared read-only between the
//! classifier (which looks up symbols and company names in questions) and
//! the binder (which refuses any ticker not in the set).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Nl2SqlError, Result};

/// A known stock symbol and the words that refer to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    /// Canonical upper-case symbol, e.g. `AAPL`.
    pub symbol: String,

    /// Lower-case single words that also name the ticker, e.g. `apple`.
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl Ticker {
    pub fn new(symbol: impl Into<String>, aliases: &[&str]) -> Self {
        Self {
            symbol: symbol.into(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Returns the tickers available when no configuration overrides them.
pub fn default_tickers() -> Vec<Ticker> {
    vec![
        Ticker::new("AAPL", &["apple"]),
        Ticker::new("MSFT", &["microsoft"]),
        Ticker::new("NVDA", &["nvidia"]),
    ]
}

/// Immutable lookup from question tokens to canonical symbols.
#[derive(Debug, Clone)]
pub struct TickerSet {
    /// Canonical symbols in configuration order.
    symbols: Vec<String>,
    /// Lower-case symbol or alias -> index into `symbols`.
    lookup: HashMap<String, usize>,
}

impl Default for TickerSet {
    fn default() -> Self {
        // The built-in list is known to be valid.
        Self::new(default_tickers()).unwrap_or_else(|_| Self::empty())
    }
}

impl TickerSet {
    fn empty() -> Self {
        Self {
            symbols: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// Builds the allow-set, rejecting malformed symbols and any word that
    /// would map to two different tickers.
    pub fn new(tickers: Vec<Ticker>) -> Result<Self> {
        let mut set = Self::empty();

        for ticker in tickers {
            let symbol = ticker.symbol.trim().to_ascii_uppercase();
            if !is_valid_symbol(&symbol) {
                return Err(Nl2SqlError::config(format!(
                    "invalid ticker symbol '{}': expected 1-5 ASCII letters",
                    ticker.symbol
                )));
            }

            let index = set.symbols.len();
            set.insert_key(symbol.to_ascii_lowercase(), index)?;
            for alias in &ticker.aliases {
                let alias = alias.trim().to_lowercase();
                if alias.is_empty() || !alias.chars().all(char::is_alphanumeric) {
                    return Err(Nl2SqlError::config(format!(
                        "invalid alias '{alias}' for ticker {symbol}: aliases must be single words"
                    )));
                }
                set.insert_key(alias, index)?;
            }
            set.symbols.push(symbol);
        }

        Ok(set)
    }

    fn insert_key(&mut self, key: String, index: usize) -> Result<()> {
        if self.lookup.contains_key(&key) {
            return Err(Nl2SqlError::config(format!(
                "duplicate ticker or alias '{key}'"
            )));
        }
        self.lookup.insert(key, index);
        Ok(())
    }

    /// Resolves a question token (symbol or alias, any case) to its symbol.
    pub fn resolve(&self, token: &str) -> Option<&str> {
        self.lookup
            .get(&token.to_lowercase())
            .map(|&i| self.symbols[i].as_str())
    }

    /// Returns the canonical symbol if `value` is exactly a known symbol
    /// (case-insensitive). Aliases are not accepted here.
    pub fn symbol(&self, value: &str) -> Option<&str> {
        self.symbols
            .iter()
            .find(|s| s.eq_ignore_ascii_case(value))
            .map(String::as_str)
    }

    /// Canonical symbols in configuration order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

fn is_valid_symbol(symbol: &str) -> bool {
    (1..=5).contains(&symbol.len()) && symbol.chars().all(|c| c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_set() {
        let set = TickerSet::default();
        assert_eq!(set.len(), 3);
        assert_eq!(set.symbols().collect::<Vec<_>>(), vec!["AAPL", "MSFT", "NVDA"]);
    }

    #[test]
    fn test_resolve_symbol_and_alias() {
        let set = TickerSet::default();
        assert_eq!(set.resolve("aapl"), Some("AAPL"));
        assert_eq!(set.resolve("Apple"), Some("AAPL"));
        assert_eq!(set.resolve("NVIDIA"), Some("NVDA"));
        assert_eq!(set.resolve("tesla"), None);
    }

    #[test]
    fn test_symbol_rejects_aliases() {
        let set = TickerSet::default();
        assert_eq!(set.symbol("msft"), Some("MSFT"));
        assert_eq!(set.symbol("microsoft"), None);
        assert_eq!(set.symbol("MSFT' OR 1=1 --"), None);
    }

    #[test]
    fn test_symbols_are_normalised() {
        let set = TickerSet::new(vec![Ticker::new(" tsla ", &["Tesla"])]).unwrap();
        assert_eq!(set.symbol("TSLA"), Some("TSLA"));
        assert_eq!(set.resolve("tesla"), Some("TSLA"));
    }

    #[test]
    fn test_invalid_symbol_rejected() {
        let err = TickerSet::new(vec![Ticker::new("BRK.B", &[])]).unwrap_err();
        assert!(err.to_string().contains("invalid ticker symbol"));

        let err = TickerSet::new(vec![Ticker::new("TOOLONG", &[])]).unwrap_err();
        assert!(err.to_string().contains("invalid ticker symbol"));
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let err = TickerSet::new(vec![
            Ticker::new("GOOG", &["alphabet"]),
            Ticker::new("GOOGL", &["alphabet"]),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_multi_word_alias_rejected() {
        let err = TickerSet::new(vec![Ticker::new("META", &["meta platforms"])]).unwrap_err();
        assert!(err.to_string().contains("single words"));
    }
}
