//! SQL templates, one per intent.
//!
//! Templates are plain strings with `{name}` placeholders. They are fixed at
//! compile time; the exhaustive match in [`template_for`] guarantees every
//! intent has exactly one.

mod binder;

pub use binder::{BoundQuery, TemplateBinder, DEFAULT_MAX_WINDOW};

use std::sync::LazyLock;

use regex::Regex;

use crate::intent::Intent;

/// Matches `{name}` placeholders.
pub(crate) static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is valid"));

/// The table every generated query reads from.
pub const PRICE_TABLE: &str = "stock_prices";

/// A parameterized SQL statement plus a one-line description of its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlTemplate {
    pub intent: Intent,
    pub sql: &'static str,
    pub explanation: &'static str,
}

impl SqlTemplate {
    /// Distinct placeholder names used by the SQL and the explanation, in
    /// order of first appearance.
    pub fn placeholders(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Vec::new();
        for text in [self.sql, self.explanation] {
            for caps in PLACEHOLDER_RE.captures_iter(text) {
                if let Some(m) = caps.get(1) {
                    if !names.contains(&m.as_str()) {
                        names.push(m.as_str());
                    }
                }
            }
        }
        names
    }
}

static AVERAGE_PRICE: SqlTemplate = SqlTemplate {
    intent: Intent::AveragePrice,
    sql: "SELECT AVG(close) FROM stock_prices WHERE ticker='{ticker}'",
    explanation: "Average closing price for {ticker}",
};

static AVERAGE_PRICE_ALL: SqlTemplate = SqlTemplate {
    intent: Intent::AveragePriceAll,
    sql: "SELECT ticker, AVG(close) AS avg_price FROM stock_prices GROUP BY ticker ORDER BY ticker",
    explanation: "Average closing price for all stocks",
};

static MOVING_AVERAGE: SqlTemplate = SqlTemplate {
    intent: Intent::MovingAverage,
    sql: concat!(
        "SELECT date, close, ",
        "AVG(close) OVER (ORDER BY date ROWS BETWEEN {window_preceding} PRECEDING AND CURRENT ROW) AS ma_{window} ",
        "FROM stock_prices WHERE ticker='{ticker}' ORDER BY date"
    ),
    explanation: "{window}-day moving average for {ticker}",
};

static DAILY_RETURNS: SqlTemplate = SqlTemplate {
    intent: Intent::DailyReturns,
    sql: concat!(
        "SELECT ticker, date, close, ",
        "ROUND((close - LAG(close) OVER (PARTITION BY ticker ORDER BY date)) / ",
        "LAG(close) OVER (PARTITION BY ticker ORDER BY date) * 100, 2) AS return_pct ",
        "FROM stock_prices ORDER BY date DESC, ticker LIMIT 30"
    ),
    explanation: "Daily returns for all stocks",
};

static RISK_METRICS: SqlTemplate = SqlTemplate {
    intent: Intent::RiskMetrics,
    sql: concat!(
        "WITH daily_returns AS (",
        "SELECT ticker, (close - LAG(close) OVER (PARTITION BY ticker ORDER BY date)) / ",
        "LAG(close) OVER (PARTITION BY ticker ORDER BY date) AS ret FROM stock_prices) ",
        "SELECT ticker, ROUND(MIN(ret) * 100, 2) AS worst_day_pct, ",
        "ROUND(AVG(CASE WHEN ret < 0 THEN ret END) * 100, 2) AS avg_loss_pct, ",
        "ROUND(COUNT(CASE WHEN ret < 0 THEN 1 END) * 100.0 / COUNT(*), 1) AS down_days_pct ",
        "FROM daily_returns WHERE ret IS NOT NULL GROUP BY ticker ORDER BY ticker"
    ),
    explanation: "Risk metrics: worst day, avg loss, down day frequency",
};

static VOLATILITY_RANKING: SqlTemplate = SqlTemplate {
    intent: Intent::VolatilityRanking,
    sql: concat!(
        "SELECT ticker, ROUND(AVG((high - low) / close * 100), 2) AS avg_volatility_pct ",
        "FROM stock_prices GROUP BY ticker ORDER BY avg_volatility_pct DESC"
    ),
    explanation: "Average daily volatility by stock",
};

static LATEST_PRICES: SqlTemplate = SqlTemplate {
    intent: Intent::LatestPrices,
    sql: "SELECT * FROM stock_prices ORDER BY date DESC LIMIT 10",
    explanation: "Most recent 10 trading days",
};

static PRICE_LOOKUP: SqlTemplate = SqlTemplate {
    intent: Intent::PriceLookup,
    sql: concat!(
        "SELECT date, open, high, low, close, volume FROM stock_prices ",
        "WHERE ticker='{ticker}' ORDER BY date DESC LIMIT 10"
    ),
    explanation: "Most recent 10 trading days for {ticker}",
};

static SAMPLE_ROWS: SqlTemplate = SqlTemplate {
    intent: Intent::SampleRows,
    sql: "SELECT * FROM stock_prices LIMIT 5",
    explanation: "Sample data",
};

/// Returns the template bound to an intent.
pub fn template_for(intent: Intent) -> &'static SqlTemplate {
    match intent {
        Intent::AveragePrice => &AVERAGE_PRICE,
        Intent::AveragePriceAll => &AVERAGE_PRICE_ALL,
        Intent::MovingAverage => &MOVING_AVERAGE,
        Intent::DailyReturns => &DAILY_RETURNS,
        Intent::RiskMetrics => &RISK_METRICS,
        Intent::VolatilityRanking => &VOLATILITY_RANKING,
        Intent::LatestPrices => &LATEST_PRICES,
        Intent::PriceLookup => &PRICE_LOOKUP,
        Intent::SampleRows => &SAMPLE_ROWS,
    }
}
