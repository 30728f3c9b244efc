//! `ayush` - command-line access to the AYUSH → ICD-11 mapping engine
//!
//! Every subcommand prints its result as JSON on stdout; logs go to stderr.

mod commands;
mod config;
mod db;
mod logging;

use anyhow::Context;
use ayush_mapping::MappingEngine;
use clap::Parser;
use std::sync::Arc;

use crate::commands::Cli;
use crate::config::Config;
use crate::db::PgTerminologyStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(url) = cli.database_url.clone() {
        config.database.url = url;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    let _log_guard =
        logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        command = cli.command.name(),
        "Starting ayush"
    );

    let pool = db::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    let engine = MappingEngine::from_store(Arc::new(PgTerminologyStore::new(pool)));

    let output = commands::run(cli.command, &engine, &config.query).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("Failed to render output")?
    );
    Ok(())
}
