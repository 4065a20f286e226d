pub mod local;
pub mod memory;
pub mod models;
pub mod remote;
pub mod traits;

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::StorageConfig;
use crate::error::Result;

pub use local::LocalStore;
pub use memory::MemoryStore;
pub use remote::RemoteStore;
pub use traits::{PriceRecord, PriceStore, UpsertOutcome};

/// Builds the backend named by the configuration. This is the only place
/// that knows which backend is in use.
pub async fn connect(storage: &StorageConfig, timeout: Duration) -> Result<Arc<dyn PriceStore>> {
    match storage {
        StorageConfig::Local { path } => {
            info!("Using local SQLite store at {}", path);
            Ok(Arc::new(LocalStore::open(path).await?))
        }
        StorageConfig::Remote(remote) => {
            info!("Using Supabase store at {}", remote.url);
            Ok(Arc::new(RemoteStore::new(remote, timeout)?))
        }
        StorageConfig::Memory => {
            warn!("Using in-memory store, prices will not be persisted");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// One asset's history, oldest first, for charting.
pub fn series(records: &[PriceRecord], asset_name: &str) -> Vec<PriceRecord> {
    let mut series: Vec<PriceRecord> = records
        .iter()
        .filter(|r| r.asset_name == asset_name)
        .cloned()
        .collect();
    series.sort_by_key(|r| r.date);
    series
}
