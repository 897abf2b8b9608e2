use crate::core::rate::RateSnapshot;
use crate::core::store::RateStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::{debug, warn};

const PARTITION: &str = "rates";
const LATEST_KEY: &str = "latest";

/// Rate store backed by a fjall keyspace on disk. Values are JSON encoded.
pub struct DiskRateStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskRateStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;

        let keyspace = Config::new(path)
            .open()
            .with_context(|| format!("Failed to open rate store at {}", path.display()))?;
        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .context("Failed to open rates partition")?;
        Ok(Self {
            keyspace,
            partition,
        })
    }
}

#[async_trait]
impl RateStore for DiskRateStore {
    async fn load_latest(&self) -> Result<Option<RateSnapshot>> {
        let Some(bytes) = self.partition.get(LATEST_KEY)? else {
            debug!("Disk store MISS");
            return Ok(None);
        };

        // A record that fails quote validation is treated as absent.
        match serde_json::from_slice::<RateSnapshot>(&bytes) {
            Ok(snapshot) => {
                debug!(source = %snapshot.provenance, "Disk store HIT");
                Ok(Some(snapshot))
            }
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable stored rates");
                Ok(None)
            }
        }
    }

    async fn save_latest(&self, snapshot: &RateSnapshot) -> Result<()> {
        let value = serde_json::to_vec(snapshot)?;
        self.partition.insert(LATEST_KEY, value)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!(source = %snapshot.provenance, "Disk store SAVE");
        Ok(())
    }
}
