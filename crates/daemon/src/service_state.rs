use std::sync::Arc;

use crate::database::{Database, DatabaseSetupError};
use crate::state::StorageBackend;
use crate::store::{DynSecretStore, MemoryStore, SqliteStore};
use crate::ServiceConfig;

/// State shared by every request handler
#[derive(Clone)]
pub struct State {
    store: DynSecretStore,
}

impl State {
    pub async fn from_config(config: &ServiceConfig) -> Result<Self, StateSetupError> {
        let store: DynSecretStore = match config.storage {
            StorageBackend::Memory => {
                tracing::info!("Using in-memory secret store");
                Arc::new(MemoryStore::new())
            }
            StorageBackend::Sqlite => {
                match config.sqlite_path {
                    Some(ref path) => {
                        tracing::info!(path = %path.display(), "Using sqlite secret store")
                    }
                    None => tracing::info!("Using in-memory sqlite secret store"),
                }
                let database = Database::connect(config.sqlite_path.as_deref()).await?;
                Arc::new(SqliteStore::new(database))
            }
        };

        Ok(Self::new(store))
    }

    pub fn new(store: DynSecretStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &DynSecretStore {
        &self.store
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("Database setup error: {0}")]
    DatabaseSetupError(#[from] DatabaseSetupError),
}
