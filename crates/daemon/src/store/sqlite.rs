use async_trait::async_trait;
use time::OffsetDateTime;

use common::prelude::SecretId;

use super::{SecretStore, StoreError};
use crate::database::Database;

/// Attempts at finding an unused id before giving up
const MAX_CREATE_ATTEMPTS: usize = 3;

/// Store backed by SQLite. Survives restarts when pointed at a file.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SecretStore for SqliteStore {
    async fn create(&self, blob: Vec<u8>) -> Result<SecretId, StoreError> {
        let created_at = OffsetDateTime::now_utc().unix_timestamp();

        for _ in 0..MAX_CREATE_ATTEMPTS {
            let id = SecretId::generate();
            let result = sqlx::query(
                r#"
                INSERT INTO secrets (id, ciphertext, created_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(id) DO NOTHING
                "#,
            )
            .bind(id.as_str())
            .bind(blob.as_slice())
            .bind(created_at)
            .execute(&*self.db)
            .await?;

            if result.rows_affected() == 1 {
                return Ok(id);
            }
            tracing::warn!("secret id collision, retrying");
        }

        Err(StoreError::Unavailable(
            "could not allocate an unused secret id".to_string(),
        ))
    }

    async fn take_once(&self, id: &SecretId) -> Result<Vec<u8>, StoreError> {
        // A single DELETE ... RETURNING statement is one write transaction:
        // the row is returned to exactly one caller and gone for everyone else.
        sqlx::query_scalar::<_, Vec<u8>>(
            r#"
            DELETE FROM secrets
            WHERE id = ?1
            RETURNING ciphertext
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&*self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn check_ready(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&*self.db).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_store() -> SqliteStore {
        SqliteStore::new(Database::connect(None).await.unwrap())
    }

    #[tokio::test]
    async fn test_create_then_take_once() {
        let store = setup_test_store().await;
        let id = store.create(vec![9; 40]).await.unwrap();

        assert_eq!(store.take_once(&id).await.unwrap(), vec![9; 40]);
        assert!(matches!(
            store.take_once(&id).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_unknown_id() {
        let store = setup_test_store().await;
        let id: SecretId = "never-created".parse().unwrap();
        assert!(matches!(
            store.take_once(&id).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_check_ready() {
        let store = setup_test_store().await;
        store.check_ready().await.unwrap();
    }

    #[tokio::test]
    async fn test_persists_across_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.sqlite");

        let id = {
            let store = SqliteStore::new(Database::connect(Some(&path)).await.unwrap());
            store.create(b"survives restarts".to_vec()).await.unwrap()
        };

        let store = SqliteStore::new(Database::connect(Some(&path)).await.unwrap());
        assert_eq!(
            store.take_once(&id).await.unwrap(),
            b"survives restarts".to_vec()
        );
    }
}
