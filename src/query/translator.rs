//! Question to SQL translation.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::intent::{Classification, IntentClassifier, TickerSet};
use crate::template::{BoundQuery, TemplateBinder};

/// Turns questions into bound SQL.
///
/// Holds only immutable state, so it can be shared between tasks behind an
/// `Arc` or by reference.
#[derive(Debug, Clone)]
pub struct Translator {
    classifier: IntentClassifier,
    binder: TemplateBinder,
}

impl Default for Translator {
    fn default() -> Self {
        let tickers = Arc::new(TickerSet::default());
        Self::new(
            IntentClassifier::new(Arc::clone(&tickers)),
            TemplateBinder::new(tickers),
        )
    }
}

impl Translator {
    pub fn new(classifier: IntentClassifier, binder: TemplateBinder) -> Self {
        Self { classifier, binder }
    }

    /// Builds a translator from validated configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let tickers = Arc::new(config.ticker_set()?);
        let settings = &config.classifier;

        let classifier = IntentClassifier::new(Arc::clone(&tickers))
            .with_default_window(settings.default_window)
            .with_default_ticker(settings.default_ticker.clone());
        let binder = TemplateBinder::new(Arc::clone(&tickers)).with_max_window(settings.max_window);

        debug!(
            "Translator ready: {} tickers, default window {}, max window {}",
            tickers.len(),
            settings.default_window,
            settings.max_window
        );
        Ok(Self::new(classifier, binder))
    }

    /// Classifies a question without binding it.
    pub fn classify(&self, question: &str) -> Result<Classification> {
        self.classifier.classify(question)
    }

    /// Translates a question into SQL with a short explanation.
    pub fn translate(&self, question: &str) -> Result<BoundQuery> {
        let classification = self.classifier.classify(question)?;
        let bound = self
            .binder
            .bind(classification.intent, &classification.params)?;
        info!(
            "Translated question to {} {}",
            bound.intent, bound.params
        );
        Ok(bound)
    }
}
