//! stock-nl2sql - rule-based translation of stock questions into SQL.
//!
//! A question is classified into an [`intent::Intent`] by an ordered keyword
//! rule list, its parameters are validated, and the intent's fixed SQL
//! template is filled in. The result can be executed against a read-only
//! SQLite dataset.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod intent;
pub mod logging;
pub mod output;
pub mod query;
pub mod safety;
pub mod template;
