pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    Refresh,
    Rates,
    Price,
    Chit,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Refresh => {
            let store = store::open_rate_store(&config)?;
            let fetcher = Arc::new(providers::http::HttpRateFetcher::new()?);
            cli::refresh::run(&config, fetcher, store.as_ref()).await
        }
        AppCommand::Rates => {
            let store = store::open_rate_store(&config)?;
            cli::rates::run(&config, store.as_ref()).await
        }
        AppCommand::Price => {
            let store = store::open_rate_store(&config)?;
            cli::price::run(&config, store.as_ref()).await
        }
        AppCommand::Chit => cli::chit::run(&config.chit_plans),
    }
}
