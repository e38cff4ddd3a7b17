#![forbid(unsafe_code)]

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

mod cli;
mod config;
mod db;
mod llm;
mod nlq;
mod utils;
mod web;

use config::Config;
use llm::{OpenAiGenerator, TextGenerator};
use nlq::{QueryExecutor, QueryTranslator, RuleSet};
use web::WebServer;

#[tokio::main]
async fn main() -> Result<()> {
    utils::logging::init_tracing();

    let args = cli::Args::parse();
    let config = Arc::new(Config::load_from_file(&args.config)?);
    info!("askdb starting up");

    let db_manager = Arc::new(db::DatabaseManager::new(&config.database)?);
    db_manager.migrate().await?;
    db_manager.seed().await?;

    let model: Option<Arc<dyn TextGenerator>> = if config.model.enabled {
        let generator = OpenAiGenerator::new(&config.model)?;
        info!(model = %config.model.model, "model fallback enabled");
        Some(Arc::new(generator))
    } else {
        info!("model fallback disabled, static rules only");
        None
    };

    let translator = Arc::new(QueryTranslator::new(
        RuleSet::builtin(),
        db_manager.query_store(),
        model,
    ));
    let executor = Arc::new(QueryExecutor::new(db_manager.query_store()));

    let web_server = WebServer::new(config.clone(), translator, executor, db_manager.clone()).await?;

    web_server.start().await?;

    info!("askdb shutting down");
    Ok(())
}
