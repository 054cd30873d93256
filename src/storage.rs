use std::sync::Arc;

use coinstore_core::Record;

use crate::config::StoreConfig;

// Re-export core storage types so callers only need this crate
pub use coinstore_core::storage::{RecordSet, RecordStore, StoreError, ValidationError};
pub use coinstore_memory::InMemoryStore;

/// Builds the store for one record type. With a data directory configured the
/// store is journaled and replays its log; otherwise it is purely in memory.
pub fn open_store<R: Record>(config: &StoreConfig) -> Result<Arc<dyn RecordStore<R>>, StoreError> {
    match &config.data_dir {
        Some(dir) => Ok(Arc::new(InMemoryStore::<R>::open(dir, config.sync_writes)?)),
        None => {
            tracing::debug!(table = R::TABLE, "No data directory configured, store is not journaled");
            Ok(Arc::new(InMemoryStore::<R>::new()))
        }
    }
}
