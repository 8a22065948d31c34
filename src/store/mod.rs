pub mod disk;
pub mod memory;

pub use disk::DiskStore;
pub use memory::MemoryStore;

use crate::core::config::AppConfig;
use crate::core::store::KeyValueStore;
use anyhow::Result;
use std::sync::Arc;

/// Opens the on-disk store under the configured data directory.
pub fn open_default(config: &AppConfig) -> Result<Arc<dyn KeyValueStore>> {
    let path = config.default_data_path()?.join("store");
    Ok(Arc::new(DiskStore::open(&path)?))
}
