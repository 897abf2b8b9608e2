//! Persistence of the last accepted rate snapshot

use crate::core::rate::{DefaultRateSet, RateSnapshot};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

#[async_trait]
pub trait RateStore: Send + Sync {
    async fn load_latest(&self) -> Result<Option<RateSnapshot>>;
    async fn save_latest(&self, snapshot: &RateSnapshot) -> Result<()>;
}

/// The stored snapshot, or the default rate set when nothing usable is stored.
pub async fn latest_or_default(
    store: &(dyn RateStore + Send + Sync),
    defaults: &DefaultRateSet,
) -> RateSnapshot {
    match store.load_latest().await {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => {
            debug!("No stored rates, using default rates");
            defaults.snapshot(Utc::now())
        }
        Err(e) => {
            warn!(error = %e, "Failed to load stored rates, using default rates");
            defaults.snapshot(Utc::now())
        }
    }
}
