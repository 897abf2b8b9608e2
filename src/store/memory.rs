use crate::core::rate::RateSnapshot;
use crate::core::store::RateStore;
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory rate store, lost when the process exits
#[derive(Default)]
pub struct MemoryRateStore {
    latest: Mutex<Option<RateSnapshot>>,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateStore for MemoryRateStore {
    async fn load_latest(&self) -> Result<Option<RateSnapshot>> {
        let latest = self.latest.lock().await;
        debug!(found = latest.is_some(), "Memory store LOAD");
        Ok(latest.clone())
    }

    async fn save_latest(&self, snapshot: &RateSnapshot) -> Result<()> {
        let mut latest = self.latest.lock().await;
        debug!(source = %snapshot.provenance, "Memory store SAVE");
        *latest = Some(snapshot.clone());
        Ok(())
    }
}
