use std::collections::hash_map::Entry;
use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use common::prelude::SecretId;

use super::{SecretStore, StoreError};

/// Process-local store. Contents are lost on restart.
///
/// A single lock guards the map. It is held only for one insert or one
/// remove, never across an `.await`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    secrets: Mutex<HashMap<SecretId, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of secrets not yet taken
    pub fn len(&self) -> usize {
        self.secrets.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.lock().is_empty()
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    async fn create(&self, blob: Vec<u8>) -> Result<SecretId, StoreError> {
        loop {
            let id = SecretId::generate();
            let mut secrets = self.secrets.lock();
            if let Entry::Vacant(entry) = secrets.entry(id.clone()) {
                entry.insert(blob);
                return Ok(id);
            }
        }
    }

    async fn take_once(&self, id: &SecretId) -> Result<Vec<u8>, StoreError> {
        self.secrets.lock().remove(id).ok_or(StoreError::NotFound)
    }

    async fn check_ready(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
