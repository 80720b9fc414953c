//! End-to-end tests: translate, guard, execute against the fixture dataset.

use pretty_assertions::assert_eq;
use stock_nl2sql::db::{DatabaseClient, QueryResult, Value};
use stock_nl2sql::intent::{ChartKind, Intent};
use stock_nl2sql::query::{QueryExecutor, QueryHistory, QueryOutcome, Translator};

use super::fixture::{self, DAYS};

async fn ask(client: &dyn DatabaseClient, question: &str) -> QueryOutcome {
    let query = Translator::default().translate(question).unwrap();
    QueryExecutor::new(client).execute(query).await.unwrap()
}

fn column_names(result: &QueryResult) -> Vec<&str> {
    result.columns.iter().map(|c| c.name.as_str()).collect()
}

fn float(value: &Value) -> f64 {
    value.as_f64().unwrap()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[tokio::test]
async fn test_average_price() {
    let client = fixture::memory_client().await;
    let outcome = ask(&client, "What's Apple's average closing price?").await;

    assert_eq!(outcome.query.intent, Intent::AveragePrice);
    assert_eq!(outcome.result.row_count, 1);
    assert_close(float(&outcome.result.rows[0][0]), 119.5);
}

#[tokio::test]
async fn test_average_price_all() {
    let client = fixture::memory_client().await;
    let outcome = ask(&client, "What is the average price of all stocks?").await;

    assert_eq!(column_names(&outcome.result), vec!["ticker", "avg_price"]);
    let tickers: Vec<&str> = outcome
        .result
        .rows
        .iter()
        .filter_map(|row| row[0].as_str())
        .collect();
    assert_eq!(tickers, vec!["AAPL", "MSFT", "NVDA"]);
    assert_close(float(&outcome.result.rows[1][1]), 319.5);
    assert_close(float(&outcome.result.rows[2][1]), 68.0);
}

#[tokio::test]
async fn test_moving_average() {
    let client = fixture::memory_client().await;
    let outcome = ask(&client, "Show me 7-day moving averages for MSFT").await;

    assert_eq!(column_names(&outcome.result), vec!["date", "close", "ma_7"]);
    assert_eq!(outcome.result.row_count, DAYS);

    let ma = outcome.result.column_values("ma_7").unwrap();
    // The window only has the first day to average over.
    assert_close(float(ma[0]), 300.0);
    // 300..=306
    assert_close(float(ma[6]), 303.0);
    // 301..=307
    assert_close(float(ma[7]), 304.0);
    assert_eq!(outcome.query.chart_kind(), ChartKind::Line);
}

#[tokio::test]
async fn test_daily_returns() {
    let client = fixture::memory_client().await;
    let outcome = ask(&client, "What are the daily returns for the last 30 days?").await;

    assert_eq!(
        column_names(&outcome.result),
        vec!["ticker", "date", "close", "return_pct"]
    );
    assert_eq!(outcome.result.row_count, 30);

    let first = &outcome.result.rows[0];
    assert_eq!(first[0], Value::from("AAPL"));
    assert_eq!(first[1], Value::String(fixture::date(DAYS - 1)));
    // (139 - 138) / 138
    assert_close(float(&first[3]), 0.72);
}

#[tokio::test]
async fn test_risk_metrics() {
    let client = fixture::memory_client().await;
    let outcome = ask(&client, "Show me risk metrics for all stocks").await;

    assert_eq!(
        column_names(&outcome.result),
        vec!["ticker", "worst_day_pct", "avg_loss_pct", "down_days_pct"]
    );
    assert_eq!(outcome.result.row_count, 3);

    let aapl = &outcome.result.rows[0];
    assert_eq!(aapl[0], Value::from("AAPL"));
    assert_eq!(aapl[2], Value::Null);
    assert_close(float(&aapl[3]), 0.0);

    let nvda = &outcome.result.rows[2];
    assert_eq!(nvda[0], Value::from("NVDA"));
    assert!(float(&nvda[1]) < 0.0);
    // 20 of 39 returns are losses.
    assert_close(float(&nvda[3]), 51.3);
}

#[tokio::test]
async fn test_volatility_ranking() {
    let client = fixture::memory_client().await;
    let outcome = ask(&client, "Which stock is most volatile?").await;

    let tickers: Vec<&str> = outcome
        .result
        .rows
        .iter()
        .filter_map(|row| row[0].as_str())
        .collect();
    assert_eq!(tickers, vec!["NVDA", "AAPL", "MSFT"]);
    assert_eq!(outcome.query.chart_kind(), ChartKind::Bar);
}

#[tokio::test]
async fn test_latest_prices() {
    let client = fixture::memory_client().await;
    let outcome = ask(&client, "Show the latest prices").await;

    assert_eq!(outcome.result.row_count, 10);
    assert_eq!(
        column_names(&outcome.result),
        vec!["date", "open", "high", "low", "close", "volume", "ticker"]
    );
    assert_eq!(outcome.result.rows[0][0], Value::String(fixture::date(DAYS - 1)));
}

#[tokio::test]
async fn test_price_lookup() {
    let client = fixture::memory_client().await;
    let outcome = ask(&client, "Show recent prices for NVDA").await;

    assert_eq!(outcome.result.row_count, 10);
    let first = &outcome.result.rows[0];
    assert_eq!(first[0], Value::String(fixture::date(DAYS - 1)));
    assert_close(float(&first[4]), fixture::close("NVDA", DAYS - 1));
    assert_eq!(first[5], Value::Int(1_000_000 + (DAYS as i64 - 1)));
}

#[tokio::test]
async fn test_sample_rows() {
    let client = fixture::memory_client().await;
    let outcome = ask(&client, "Show me sample data").await;

    assert_eq!(outcome.result.row_count, 5);
    assert_eq!(outcome.query.chart_kind(), ChartKind::Table);
}

#[tokio::test]
async fn test_history_across_questions() {
    let client = fixture::memory_client().await;
    let mut history = QueryHistory::new();

    for question in [
        "Which stock is most volatile?",
        "Show me sample data",
        "What is the average price of all stocks?",
    ] {
        let outcome = ask(&client, question).await;
        history.record(question, &outcome);
    }

    let rows: Vec<Option<usize>> = history.entries().iter().map(|e| e.rows).collect();
    assert_eq!(rows, vec![Some(3), Some(5), Some(3)]);
}
