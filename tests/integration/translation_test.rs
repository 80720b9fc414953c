//! Question to SQL translation tests.

use pretty_assertions::assert_eq;
use std::io::Write;
use stock_nl2sql::config::Config;
use stock_nl2sql::error::Nl2SqlError;
use stock_nl2sql::intent::{Intent, Param};
use stock_nl2sql::query::Translator;
use stock_nl2sql::safety::classify_sql;

fn translator() -> Translator {
    Translator::from_config(&Config::default()).unwrap()
}

#[test]
fn test_apple_average_closing_price() {
    let query = translator()
        .translate("What's Apple's average closing price?")
        .unwrap();

    assert_eq!(query.intent, Intent::AveragePrice);
    assert_eq!(
        query.sql,
        "SELECT AVG(close) FROM stock_prices WHERE ticker='AAPL'"
    );
}

#[test]
fn test_msft_seven_day_moving_average() {
    let query = translator()
        .translate("Show me 7-day moving averages for MSFT")
        .unwrap();

    assert_eq!(query.intent, Intent::MovingAverage);
    assert_eq!(query.params.get(Param::Ticker), Some("MSFT"));
    assert_eq!(query.params.get(Param::Window), Some("7"));
    assert_eq!(
        query.sql,
        "SELECT date, close, AVG(close) OVER (ORDER BY date ROWS BETWEEN 6 PRECEDING AND CURRENT ROW) AS ma_7 \
         FROM stock_prices WHERE ticker='MSFT' ORDER BY date"
    );
    assert_eq!(query.explanation, "7-day moving average for MSFT");
}

#[test]
fn test_gibberish_is_unrecognized() {
    let err = translator().translate("asdkjasd").unwrap_err();
    assert_eq!(
        err,
        Nl2SqlError::UnrecognizedIntent {
            question: "asdkjasd".to_string()
        }
    );
}

#[test]
fn test_question_routing() {
    let cases = [
        ("What is the average price of all stocks?", Intent::AveragePriceAll),
        ("Which stock is most volatile?", Intent::VolatilityRanking),
        ("Show me risk metrics for all stocks", Intent::RiskMetrics),
        ("What are the daily returns for the last 30 days?", Intent::DailyReturns),
        ("Show the latest prices", Intent::LatestPrices),
        ("Show recent prices for NVDA", Intent::PriceLookup),
        ("Give me the price history for MSFT", Intent::PriceLookup),
        ("Show me sample data", Intent::SampleRows),
        ("What is the 30-day moving average for nvidia", Intent::MovingAverage),
    ];

    let translator = translator();
    for (question, expected) in cases {
        let query = translator.translate(question).unwrap();
        assert_eq!(query.intent, expected, "{question}");
    }
}

#[test]
fn test_every_translation_is_read_only() {
    let translator = translator();
    for question in [
        "What's Apple's average closing price?",
        "What is the average price of all stocks?",
        "Show me the 30-day moving average for nvidia",
        "Which stock is most volatile?",
        "Show me risk metrics for all stocks",
        "What are the daily returns?",
        "Show the latest prices",
        "Show recent prices for NVDA",
        "Show me sample data",
    ] {
        let query = translator.translate(question).unwrap();
        assert!(classify_sql(&query.sql).is_safe(), "{question}: {}", query.sql);
    }
}

#[test]
fn test_unknown_ticker_is_rejected() {
    let err = translator()
        .translate("What is the average price of TSLA?")
        .unwrap_err();
    assert_eq!(
        err,
        Nl2SqlError::InvalidParameterValue {
            name: Param::Ticker,
            value: "TSLA".to_string()
        }
    );
}

#[test]
fn test_quote_in_question_never_reaches_sql() {
    let query = translator()
        .translate("average price of AAPL'; DROP TABLE stock_prices; --")
        .unwrap();
    assert_eq!(
        query.sql,
        "SELECT AVG(close) FROM stock_prices WHERE ticker='AAPL'"
    );
}

#[test]
fn test_case_insensitive_aliases() {
    let query = translator()
        .translate("WHAT IS THE AVERAGE PRICE OF APPLE?")
        .unwrap();
    assert_eq!(query.params.get(Param::Ticker), Some("AAPL"));
}

#[test]
fn test_tickers_come_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[classifier]
default_window = 10

[[tickers]]
symbol = "TSLA"
aliases = ["tesla"]
"#
    )
    .unwrap();

    let config = Config::load_from_file(file.path()).unwrap();
    let translator = Translator::from_config(&config).unwrap();

    let query = translator.translate("Moving average for tesla").unwrap();
    assert_eq!(
        query.sql,
        "SELECT date, close, AVG(close) OVER (ORDER BY date ROWS BETWEEN 9 PRECEDING AND CURRENT ROW) AS ma_10 \
         FROM stock_prices WHERE ticker='TSLA' ORDER BY date"
    );

    // AAPL is no longer in the allow-set.
    let err = translator.translate("average price of AAPL").unwrap_err();
    assert!(matches!(err, Nl2SqlError::InvalidParameterValue { .. }));
}
