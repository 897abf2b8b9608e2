use super::ui;
use crate::core::aggregator::RateAggregator;
use crate::core::config::AppConfig;
use crate::core::fetch::RateFetcher;
use crate::core::store::RateStore;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Runs the provider cascade once and persists the winning rates.
pub async fn run(
    config: &AppConfig,
    fetcher: Arc<dyn RateFetcher>,
    store: &(dyn RateStore + Send + Sync),
) -> Result<()> {
    let aggregator = RateAggregator::new(fetcher, config.aggregator_config()?);

    let spinner = ui::new_spinner("Fetching metal rates...");
    let result = aggregator.fetch_best_rates(&config.providers).await;
    spinner.finish_and_clear();

    let snapshot = result.context("Rate refresh failed")?;
    store
        .save_latest(&snapshot)
        .await
        .context("Failed to store refreshed rates")?;
    info!(
        source = %snapshot.provenance,
        live = snapshot.provenance.is_live(),
        "Stored refreshed rates"
    );

    println!("{}", snapshot.display_as_table());
    Ok(())
}
