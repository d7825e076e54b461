pub mod disk;
pub mod memory;

use crate::core::config::{AppConfig, StoreKind};
use crate::core::repository::VacationRepository;
use anyhow::Result;
use disk::DiskVacationStore;
use memory::MemoryVacationStore;
use std::sync::Arc;
use tracing::debug;

/// Opens the vacation repository selected by the configuration.
pub fn open_repository(config: &AppConfig) -> Result<Arc<dyn VacationRepository>> {
    match config.store {
        StoreKind::Memory => {
            debug!("Using in-memory vacation store");
            Ok(Arc::new(MemoryVacationStore::new()))
        }
        StoreKind::Disk => {
            let path = config.default_data_path()?;
            Ok(Arc::new(DiskVacationStore::open(&path)?))
        }
    }
}
