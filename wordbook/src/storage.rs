use std::path::Path;

use async_trait::async_trait;
use dictionary::{KeyValueStore, StorageError};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{query, query_scalar, Pool, Sqlite, SqlitePool};

/// Key-value store kept in a single SQLite table.
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn initialize(path: &Path) -> sqlx::Result<Self> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        sqlx::migrate!().run(&pool).await?;
        log::debug!("Opened storage at {}", path.display());
        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn backend_error(error: sqlx::Error) -> StorageError {
    StorageError::Backend(Box::new(error))
}

#[async_trait]
impl KeyValueStore for Storage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        query_scalar::<_, String>("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend_error)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        query(
            "
            INSERT INTO kv(key, value) VALUES(?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP;
            ",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map(|_| ())
        .map_err(backend_error)
    }
}
