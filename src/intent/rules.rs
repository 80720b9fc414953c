//! Ordered keyword rules mapping questions to intents.
//!
//! Rules are evaluated top to bottom and the first match wins, so more
//! specific phrasings must come before generic ones ("moving average"
//! before "average").

use super::Intent;

/// Keyword sets, matched against the lower-cased question.
mod keywords {
    pub const MOVING_AVERAGE: &[&str] = &["moving average", "rolling average", "sma", "trend"];

    pub const RETURNS: &[&str] = &["daily return", "returns", "return", "daily change"];

    pub const RISK: &[&str] = &["risk", "drawdown", "worst"];

    pub const VOLATILITY: &[&str] = &["volatile", "volatility"];

    pub const AVERAGE: &[&str] = &["average", "avg", "mean"];

    pub const RECENT_FOR_TICKER: &[&str] = &["latest", "recent", "last"];

    pub const RECENT: &[&str] = &["latest", "recent"];

    pub const LOOKUP: &[&str] = &[
        "price", "prices", "history", "quote", "close", "lookup", "look up", "data",
    ];

    pub const SAMPLE: &[&str] = &["sample", "preview", "example"];
}

/// Extra condition on the ticker extracted from the question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerCondition {
    /// Matches regardless of tickers.
    Any,
    /// Matches only if the question mentions a ticker.
    Mentioned,
}

/// A single (predicate, intent) pair.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub intent: Intent,
    pub keywords: &'static [&'static str],
    pub ticker: TickerCondition,
}

impl Rule {
    const fn new(intent: Intent, keywords: &'static [&'static str]) -> Self {
        Self {
            intent,
            keywords,
            ticker: TickerCondition::Any,
        }
    }

    const fn with_ticker(intent: Intent, keywords: &'static [&'static str]) -> Self {
        Self {
            intent,
            keywords,
            ticker: TickerCondition::Mentioned,
        }
    }

    /// Returns the first keyword found in `question`, which must already be
    /// lower-cased, if the ticker condition also holds.
    pub fn matched_keyword(&self, question: &str, ticker_mentioned: bool) -> Option<&'static str> {
        if self.ticker == TickerCondition::Mentioned && !ticker_mentioned {
            return None;
        }
        self.keywords
            .iter()
            .copied()
            .find(|kw| contains_keyword(question, kw))
    }
}

/// Keywords this short only count as whole words, optionally plural:
/// "sma" must not fire on "small".
const WHOLE_WORD_MAX_LEN: usize = 3;

fn contains_keyword(question: &str, keyword: &str) -> bool {
    if keyword.len() > WHOLE_WORD_MAX_LEN {
        return question.contains(keyword);
    }

    question.match_indices(keyword).any(|(start, _)| {
        let before = question[..start].chars().next_back();
        let rest = &question[start + keyword.len()..];
        let rest = rest.strip_prefix('s').unwrap_or(rest);
        let after = rest.chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// The classification rules, highest priority first.
pub static RULES: &[Rule] = &[
    Rule::new(Intent::MovingAverage, keywords::MOVING_AVERAGE),
    Rule::new(Intent::DailyReturns, keywords::RETURNS),
    Rule::new(Intent::RiskMetrics, keywords::RISK),
    Rule::new(Intent::VolatilityRanking, keywords::VOLATILITY),
    Rule::with_ticker(Intent::AveragePrice, keywords::AVERAGE),
    Rule::new(Intent::AveragePriceAll, keywords::AVERAGE),
    Rule::with_ticker(Intent::PriceLookup, keywords::RECENT_FOR_TICKER),
    Rule::new(Intent::LatestPrices, keywords::RECENT),
    Rule::with_ticker(Intent::PriceLookup, keywords::LOOKUP),
    Rule::new(Intent::SampleRows, keywords::SAMPLE),
];

/// Finds the first rule matching a lower-cased question.
pub(crate) fn first_match(
    rules: &'static [Rule],
    question: &str,
    ticker_mentioned: bool,
) -> Option<(&'static Rule, &'static str)> {
    rules.iter().find_map(|rule| {
        rule.matched_keyword(question, ticker_mentioned)
            .map(|kw| (rule, kw))
    })
}
