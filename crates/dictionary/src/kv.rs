use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

/// Fixed key names. Changing any of these orphans data saved by earlier builds.
pub mod keys {
    pub const SAVED_WORDS: &str = "savedWords";
    pub const DAILY_SELECTION: &str = "dailySelection";
    pub const DARK_MODE: &str = "darkMode";
    pub const FONT_SIZE_MULTIPLIER: &str = "fontSizeMultiplier";
    pub const PUSH_NOTIFICATIONS: &str = "pushNotifications";
    pub const DO_NOT_DISTURB: &str = "doNotDisturb";
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage backend failed: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("storage is unavailable: {0}")]
    Unavailable(String),
}

/// String values addressed by string keys. Everything the crate persists goes through this.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

pub type SharedStore = Arc<dyn KeyValueStore>;

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStore {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .lock()
            .await
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
