//! nl2sql - answers plain-English stock questions with SQL.

use std::io::{self, BufRead};

use stock_nl2sql::cli::{Cli, QuestionSource, DEMO_QUESTIONS};
use stock_nl2sql::config::Config;
use stock_nl2sql::db::{self, DatabaseClient};
use stock_nl2sql::error::{Nl2SqlError, Result};
use stock_nl2sql::logging;
use stock_nl2sql::output::AnswerFormatter;
use stock_nl2sql::query::{QueryExecutor, QueryHistory, Translator};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Before argument parsing, so NL2SQL_DATABASE can come from .env.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    if cli.log_file {
        logging::init_file_logging();
    } else {
        logging::init_stderr_logging();
    }

    match run(cli).await {
        Ok(0) => {}
        Ok(failed) => {
            warn!("{failed} question(s) could not be answered");
            std::process::exit(1);
        }
        Err(e) => {
            error!("{}: {}", e.category(), e);
            std::process::exit(1);
        }
    }
}

/// Answers every question of the run. Returns how many failed.
async fn run(cli: Cli) -> Result<usize> {
    let format = cli.parse_output_format().map_err(Nl2SqlError::config)?;

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    cli.apply_to(&mut config);

    let translator = Translator::from_config(&config)?;
    let questions = collect_questions(&cli)?;

    let db = if cli.sql_only {
        None
    } else {
        info!("Opening dataset {}", config.database.path.display());
        Some(db::connect(&config.database).await?)
    };

    let formatter = AnswerFormatter::new(format);
    let mut history = QueryHistory::new();
    let mut failed = 0;

    for question in &questions {
        let answered = answer(question, &translator, db.as_deref(), &formatter, &mut history).await;
        if let Err(e) = answered {
            if e.is_translation_error() {
                warn!("{}: {}", e.category(), e);
            } else {
                error!("{}: {}", e.category(), e);
            }
            print!("{}", formatter.format_error(question, &e));
            failed += 1;
        }
    }

    if questions.len() > 1 {
        print!("{}", formatter.format_summary(&history));
    }

    if let Some(db) = db {
        db.close().await?;
    }

    Ok(failed)
}

async fn answer(
    question: &str,
    translator: &Translator,
    db: Option<&dyn DatabaseClient>,
    formatter: &AnswerFormatter,
    history: &mut QueryHistory,
) -> Result<()> {
    let query = translator.translate(question)?;

    let Some(db) = db else {
        print!("{}", formatter.format_answer(question, &query, None));
        history.record_translation(question, &query.sql);
        return Ok(());
    };

    let outcome = QueryExecutor::new(db).execute(query).await?;
    print!(
        "{}",
        formatter.format_answer(question, &outcome.query, Some(&outcome.result))
    );
    history.record(question, &outcome);
    Ok(())
}

fn collect_questions(cli: &Cli) -> Result<Vec<String>> {
    match cli.question_source() {
        QuestionSource::Single(question) => Ok(vec![question]),
        QuestionSource::Demo => Ok(DEMO_QUESTIONS.iter().map(|q| q.to_string()).collect()),
        QuestionSource::Stdin => {
            let mut questions = Vec::new();
            for line in io::stdin().lock().lines() {
                let line = line.map_err(|e| Nl2SqlError::internal(format!("Failed to read stdin: {e}")))?;
                let line = line.trim();
                if !line.is_empty() {
                    questions.push(line.to_string());
                }
            }
            Ok(questions)
        }
    }
}
