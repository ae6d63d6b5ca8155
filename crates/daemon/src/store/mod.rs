//! Server-side storage of sealed secrets.
//!
//! Each id moves through `absent -> present -> absent` exactly once.
//! [`SecretStore::take_once`] is the only way to read a secret and it deletes
//! the record in the same indivisible step, so concurrent readers of one id
//! see exactly one success.
//!
//! The store never sees plaintext or keys. Blobs are opaque bytes.

mod memory;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;

use common::prelude::SecretId;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Persist a sealed blob under a fresh, unpredictable id.
    async fn create(&self, blob: Vec<u8>) -> Result<SecretId, StoreError>;

    /// Atomically read and delete the blob stored under `id`.
    ///
    /// Returns [`StoreError::NotFound`] if the id was never created or has
    /// already been taken.
    async fn take_once(&self, id: &SecretId) -> Result<Vec<u8>, StoreError>;

    /// Cheap round trip to the backend, used by the readiness check.
    async fn check_ready(&self) -> Result<(), StoreError>;
}

pub type DynSecretStore = Arc<dyn SecretStore>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("secret not found")]
    NotFound,
    /// Carries backend detail for logs; never sent to clients.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}
