pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use crate::core::store::RateStore;
use anyhow::Result;
use disk::DiskRateStore;
use std::sync::Arc;
use tracing::debug;

/// Opens the on-disk rate store under the configured data path.
pub fn open_rate_store(config: &AppConfig) -> Result<Arc<dyn RateStore + Send + Sync>> {
    let path = config.default_data_path()?.join("rates");
    debug!("Opening rate store at {}", path.display());
    Ok(Arc::new(DiskRateStore::open(&path)?))
}
