//! Fills SQL templates with validated parameter values.
//!
//! This is string templating, not prepared-statement binding, so validation
//! is the only thing standing between question text and the SQL: tickers
//! must be in the allow-set and windows must be integers in range.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::{template_for, PLACEHOLDER_RE};
use crate::error::{Nl2SqlError, Result};
use crate::intent::{ChartKind, Intent, Param, ParameterSet, TickerSet};

/// Largest window accepted when configuration does not say otherwise.
pub const DEFAULT_MAX_WINDOW: u32 = 365;

/// A finished query ready to hand to the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundQuery {
    pub intent: Intent,
    pub sql: String,
    pub explanation: String,
    pub params: ParameterSet,
}

impl BoundQuery {
    /// Chart type suggested for this query's result.
    pub fn chart_kind(&self) -> ChartKind {
        self.intent.chart_kind()
    }
}

/// Binds intents and parameters to their SQL templates.
#[derive(Debug, Clone)]
pub struct TemplateBinder {
    tickers: Arc<TickerSet>,
    max_window: u32,
}

impl Default for TemplateBinder {
    fn default() -> Self {
        Self::new(Arc::new(TickerSet::default()))
    }
}

impl TemplateBinder {
    pub fn new(tickers: Arc<TickerSet>) -> Self {
        Self {
            tickers,
            max_window: DEFAULT_MAX_WINDOW,
        }
    }

    pub fn with_max_window(mut self, max_window: u32) -> Self {
        self.max_window = max_window;
        self
    }

    /// Produces the SQL for an intent.
    ///
    /// Every placeholder in the template must resolve to a valid value;
    /// parameters the template does not use are ignored.
    pub fn bind(&self, intent: Intent, params: &ParameterSet) -> Result<BoundQuery> {
        let template = template_for(intent);

        let mut values: HashMap<&str, String> = HashMap::new();
        for name in template.placeholders() {
            let value = self.resolve(intent, name, params)?;
            values.insert(name, value);
        }

        let fill = |text: &str| {
            PLACEHOLDER_RE
                .replace_all(text, |caps: &regex::Captures| {
                    values.get(&caps[1]).cloned().unwrap_or_default()
                })
                .into_owned()
        };

        let sql = fill(template.sql);
        let explanation = fill(template.explanation);
        debug!("Bound {intent}: {sql}");

        Ok(BoundQuery {
            intent,
            sql,
            explanation,
            params: params.clone(),
        })
    }

    /// Resolves and validates the value for one placeholder.
    fn resolve(&self, intent: Intent, name: &str, params: &ParameterSet) -> Result<String> {
        match name {
            "ticker" => self.ticker(intent, params),
            "window" => self.window(intent, params).map(|w| w.to_string()),
            "window_preceding" => self.window(intent, params).map(|w| (w - 1).to_string()),
            other => Err(Nl2SqlError::internal(format!(
                "template for {intent} uses unknown placeholder '{other}'"
            ))),
        }
    }

    fn ticker(&self, intent: Intent, params: &ParameterSet) -> Result<String> {
        let raw = params
            .get(Param::Ticker)
            .ok_or_else(|| Nl2SqlError::missing(intent, Param::Ticker))?;

        self.tickers
            .symbol(raw.trim())
            .map(str::to_string)
            .ok_or_else(|| Nl2SqlError::invalid(Param::Ticker, raw))
    }

    fn window(&self, intent: Intent, params: &ParameterSet) -> Result<u32> {
        let raw = params
            .get(Param::Window)
            .ok_or_else(|| Nl2SqlError::missing(intent, Param::Window))?;

        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(Nl2SqlError::invalid(Param::Window, raw));
        }

        match trimmed.parse::<u32>() {
            Ok(window) if (1..=self.max_window).contains(&window) => Ok(window),
            _ => Err(Nl2SqlError::invalid(Param::Window, raw)),
        }
    }
}
