//! Deterministic price data shared by the integration tests.
//!
//! Forty trading days per ticker starting 2024-01-01. AAPL and MSFT rise by
//! one every day; NVDA alternates between a four point gain and a two point
//! loss and has the widest intraday range.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use stock_nl2sql::db::SqliteClient;

pub const DAYS: usize = 40;

const CREATE_TABLE: &str = "CREATE TABLE stock_prices (
    date TEXT NOT NULL,
    open REAL,
    high REAL,
    low REAL,
    close REAL,
    volume INTEGER,
    ticker TEXT NOT NULL
)";

/// ISO date of trading day `i`.
pub fn date(i: usize) -> String {
    if i < 31 {
        format!("2024-01-{:02}", i + 1)
    } else {
        format!("2024-02-{:02}", i - 30)
    }
}

/// Closing price of `ticker` on day `i`.
pub fn close(ticker: &str, i: usize) -> f64 {
    let day = i as f64;
    match ticker {
        "AAPL" => 100.0 + day,
        "MSFT" => 300.0 + day,
        "NVDA" if i % 2 == 1 => 47.0 + day,
        "NVDA" => 50.0 + day,
        _ => unreachable!("fixture has no {ticker}"),
    }
}

async fn seed(pool: &SqlitePool) {
    sqlx::query(CREATE_TABLE).execute(pool).await.unwrap();

    for ticker in ["AAPL", "MSFT", "NVDA"] {
        let spread = if ticker == "NVDA" { 5.0 } else { 2.0 };
        for i in 0..DAYS {
            let close = close(ticker, i);
            sqlx::query(
                "INSERT INTO stock_prices (date, open, high, low, close, volume, ticker) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(date(i))
            .bind(close - 1.0)
            .bind(close + spread)
            .bind(close - spread)
            .bind(close)
            .bind(1_000_000_i64 + i as i64)
            .bind(ticker)
            .execute(pool)
            .await
            .unwrap();
        }
    }
}

/// A client over a seeded in-memory dataset.
pub async fn memory_client() -> SqliteClient {
    // One connection, so every query sees the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    seed(&pool).await;
    SqliteClient::from_pool(pool)
}

/// Writes a seeded dataset file at `path`.
pub async fn write_dataset(path: &Path) {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        // Rollback journal, so the file opens read-only without -shm/-wal files.
        .journal_mode(SqliteJournalMode::Delete);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    seed(&pool).await;
    pool.close().await;
}
