//! Integration tests for stock-nl2sql.

pub mod dataset_test;
pub mod execution_test;
pub mod fixture;
pub mod translation_test;
