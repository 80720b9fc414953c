//! Question intent classification.
//!
//! Maps a free-form question onto one of a closed set of intents and
//! extracts the parameters (ticker, window size) the intent's SQL template
//! needs.

mod classifier;
mod rules;
mod tickers;

pub use classifier::{
    extract_window, extract_windows, Classification, IntentClassifier, DEFAULT_WINDOW,
};
pub use rules::{Rule, TickerCondition, RULES};
pub use tickers::{default_tickers, Ticker, TickerSet};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The closed set of question categories the classifier recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Average closing price of one ticker.
    AveragePrice,
    /// Average closing price of every ticker, grouped.
    AveragePriceAll,
    /// Rolling average of closing prices for one ticker.
    MovingAverage,
    /// Day-over-day percentage change for all tickers.
    DailyReturns,
    /// Worst day, average loss and share of down days per ticker.
    RiskMetrics,
    /// Tickers ranked by average intraday range.
    VolatilityRanking,
    /// Most recent trading days across all tickers.
    LatestPrices,
    /// Recent price rows for one ticker.
    PriceLookup,
    /// A handful of raw rows.
    SampleRows,
}

impl Intent {
    /// Every intent, in declaration order.
    pub const ALL: [Intent; 9] = [
        Intent::AveragePrice,
        Intent::AveragePriceAll,
        Intent::MovingAverage,
        Intent::DailyReturns,
        Intent::RiskMetrics,
        Intent::VolatilityRanking,
        Intent::LatestPrices,
        Intent::PriceLookup,
        Intent::SampleRows,
    ];

    /// Returns the stable snake_case name of the intent.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AveragePrice => "average_price",
            Self::AveragePriceAll => "average_price_all",
            Self::MovingAverage => "moving_average",
            Self::DailyReturns => "daily_returns",
            Self::RiskMetrics => "risk_metrics",
            Self::VolatilityRanking => "volatility_ranking",
            Self::LatestPrices => "latest_prices",
            Self::PriceLookup => "price_lookup",
            Self::SampleRows => "sample_rows",
        }
    }

    /// Returns true if the intent's template filters on a single ticker.
    pub fn requires_ticker(&self) -> bool {
        matches!(
            self,
            Self::AveragePrice | Self::MovingAverage | Self::PriceLookup
        )
    }

    /// Returns true if the intent takes a window size.
    pub fn uses_window(&self) -> bool {
        matches!(self, Self::MovingAverage)
    }

    /// Suggests how a chart renderer should present this intent's result.
    pub fn chart_kind(&self) -> ChartKind {
        match self {
            Self::MovingAverage | Self::PriceLookup | Self::LatestPrices => ChartKind::Line,
            Self::DailyReturns
            | Self::RiskMetrics
            | Self::VolatilityRanking
            | Self::AveragePriceAll => ChartKind::Bar,
            Self::AveragePrice | Self::SampleRows => ChartKind::Table,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chart type suggested for an intent's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Time series plot.
    Line,
    /// Per-ticker or per-day comparison.
    Bar,
    /// Not worth plotting; show the table.
    Table,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line => write!(f, "line"),
            Self::Bar => write!(f, "bar"),
            Self::Table => write!(f, "table"),
        }
    }
}

/// Names of the parameters a question can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Param {
    /// Stock symbol, e.g. `AAPL`.
    Ticker,
    /// Window size in trading days.
    Window,
}

impl Param {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ticker => "ticker",
            Self::Window => "window",
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw parameter values extracted from a question.
///
/// Values are kept as the text the classifier found; the binder validates
/// them before they reach any SQL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSet(BTreeMap<Param, String>);

impl ParameterSet {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, param: Param, value: impl Into<String>) -> Self {
        self.insert(param, value);
        self
    }

    /// Sets a value, replacing any previous one for the same name.
    pub fn insert(&mut self, param: Param, value: impl Into<String>) {
        self.0.insert(param, value.into());
    }

    /// Returns the raw value for a parameter, if present.
    pub fn get(&self, param: Param) -> Option<&str> {
        self.0.get(&param).map(String::as_str)
    }

    pub fn contains(&self, param: Param) -> bool {
        self.0.contains_key(&param)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (Param, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{k}={v}")).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}
