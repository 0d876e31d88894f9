pub mod cli;
pub mod core;
pub mod store;

use crate::cli::OutputFormat;
use crate::core::config::AppConfig;
use crate::core::{Analytics, CachedAnalytics};
use crate::store::CsvStore;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Summary,
    Returns,
}

pub fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    info!("Ledgerfolio starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = CsvStore::from_config(&config.ledger, config.base_dir())?;
    let analytics =
        CachedAnalytics::new(Analytics::new(&store, &store, config.balance_snapshots));

    match command {
        AppCommand::Summary => cli::summary::run(&analytics, &config.display, format),
        AppCommand::Returns => cli::returns::run(&analytics, &config.display, format),
    }
}
