//! Question answering pipeline.
//!
//! Ties the classifier and binder together into a [`Translator`], runs the
//! resulting SQL through the read-only guard and the database, and keeps a
//! per-session history of what was asked.

mod executor;
mod history;
mod translator;

pub use executor::{QueryExecutor, QueryOutcome};
pub use history::{HistoryEntry, QueryHistory};
pub use translator::Translator;
