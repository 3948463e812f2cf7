mod dynamo;
mod memory;
mod models;
mod queries;
mod store;

pub use dynamo::DynamoStore;
pub use memory::MemoryStore;
pub use models::*;
pub use queries::*;
pub use store::{RecordStore, StoreError};

use std::sync::Arc;

use crate::config::Config;

/// Handle to the record store.
///
/// Constructed once per process and cloned into each task; the underlying
/// store connection is shared behind the capability trait and carries no
/// per-request state.
#[derive(Clone)]
pub struct Database {
    store: Arc<dyn RecordStore>,
}

impl Database {
    /// Create a DynamoDB-backed database from configuration.
    pub async fn new(config: &Config) -> Self {
        Self::with_store(Arc::new(DynamoStore::new(config).await))
    }

    /// Create a database over an arbitrary store backend.
    #[must_use]
    pub fn with_store(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Get a reference to the store backend.
    #[must_use]
    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}
