//! Integration tests for stock-nl2sql.
//!
//! Every test runs against a small in-memory or temporary SQLite dataset, so
//! no external setup is needed.
//!
//! Run with: `cargo test --test integration_tests`

mod integration;
