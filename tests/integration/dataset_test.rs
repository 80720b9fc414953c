//! Opening a dataset file from configuration.

use stock_nl2sql::config::DatabaseConfig;
use stock_nl2sql::db::{self, DatabaseClient};

use super::fixture;

#[tokio::test]
async fn test_connect_reads_dataset_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stock_database.db");
    fixture::write_dataset(&path).await;

    let config = DatabaseConfig {
        path,
        ..Default::default()
    };
    let client = db::connect(&config).await.unwrap();

    let result = client
        .execute_query("SELECT COUNT(*) AS n FROM stock_prices")
        .await
        .unwrap();
    assert_eq!(result.rows[0][0].as_f64(), Some((3 * fixture::DAYS) as f64));

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_dataset_is_opened_read_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stock_database.db");
    fixture::write_dataset(&path).await;

    let config = DatabaseConfig {
        path,
        ..Default::default()
    };
    let client = db::connect(&config).await.unwrap();

    // Bypasses the guard to check the connection itself refuses writes.
    let err = client
        .execute_query("DELETE FROM stock_prices")
        .await
        .unwrap_err();
    assert_eq!(err.category(), "Query Error");
    assert!(err.to_string().contains("readonly"));

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_row_cap_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stock_database.db");
    fixture::write_dataset(&path).await;

    let config = DatabaseConfig {
        path,
        max_rows: 25,
        ..Default::default()
    };
    let client = db::connect(&config).await.unwrap();

    let result = client
        .execute_query("SELECT * FROM stock_prices")
        .await
        .unwrap();
    assert_eq!(result.row_count, 25);
    assert_eq!(result.total_rows, 3 * fixture::DAYS);
    assert!(result.was_truncated);
}
