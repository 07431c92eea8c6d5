//! Key-value persistence adapter
//!
//! Stores hand opaque strings to a [`KeyValueStore`] under fixed keys. The
//! adapter knows nothing about what the strings mean; the snapshot format lives
//! in [`crate::persistence`].

use async_trait::async_trait;
use parking_lot::RwLock;
use sled::Db;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Key-value store error types
#[derive(Debug, Error)]
pub enum KvError {
    /// Sled database error
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    /// Stored bytes were not valid UTF-8
    #[error("Invalid UTF-8 value for key: {0}")]
    InvalidValue(String),

    /// Backend-specific failure reported by an external adapter
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for key-value operations
pub type Result<T> = std::result::Result<T, KvError>;

/// Async string storage keyed by opaque string keys.
///
/// Implementations only promise per-key last-write-wins; there is no
/// atomicity across keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if absent
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set_item(&self, key: &str, value: String) -> Result<()>;

    /// Delete `key`. Removing an absent key succeeds.
    async fn remove_item(&self, key: &str) -> Result<()>;
}

/// Key-value store configuration
#[derive(Debug, Clone)]
pub struct KvConfig {
    /// Database path
    pub path: String,
    /// Cache capacity in bytes
    pub cache_capacity: u64,
    /// Enable compression
    pub use_compression: bool,
    /// Flush interval in milliseconds (None for immediate flush)
    pub flush_every_ms: Option<u64>,
    /// Delete the database when it is dropped
    pub temporary: bool,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            path: "daily_manna_kv.db".to_string(),
            cache_capacity: 8 * 1024 * 1024, // 8MB
            use_compression: true,
            flush_every_ms: Some(500),
            temporary: false,
        }
    }
}

impl KvConfig {
    /// Create a new configuration with a custom path
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), ..Default::default() }
    }

    /// Set cache capacity in bytes
    pub fn cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity = bytes;
        self
    }

    /// Enable or disable compression
    pub fn use_compression(mut self, enabled: bool) -> Self {
        self.use_compression = enabled;
        self
    }

    /// Set flush interval in milliseconds
    pub fn flush_every_ms(mut self, ms: Option<u64>) -> Self {
        self.flush_every_ms = ms;
        self
    }

    /// Remove the database files on drop
    pub fn temporary(mut self, temporary: bool) -> Self {
        self.temporary = temporary;
        self
    }
}

/// Device storage backed by sled
pub struct SledKvStore {
    db: Arc<Db>,
}

impl SledKvStore {
    /// Open (or create) the database described by `config`
    pub fn new(config: KvConfig) -> Result<Self> {
        let db = sled::Config::new()
            .path(&config.path)
            .cache_capacity(config.cache_capacity)
            .use_compression(config.use_compression)
            .flush_every_ms(config.flush_every_ms)
            .temporary(config.temporary)
            .open()?;

        tracing::debug!(path = %config.path, "opened key-value store");
        Ok(Self { db: Arc::new(db) })
    }

    /// Create an in-memory key-value store (for testing)
    pub fn in_memory() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Flush pending writes to disk
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    /// All keys currently stored
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for item in self.db.iter() {
            let (key, _) = item?;
            if let Ok(key_str) = String::from_utf8(key.to_vec()) {
                keys.push(key_str);
            }
        }
        Ok(keys)
    }
}

#[async_trait]
impl KeyValueStore for SledKvStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        match self.db.get(key.as_bytes())? {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|_| KvError::InvalidValue(key.to_string())),
            None => Ok(None),
        }
    }

    async fn set_item(&self, key: &str, value: String) -> Result<()> {
        self.db.insert(key.as_bytes(), value.into_bytes())?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        self.db.remove(key.as_bytes())?;
        Ok(())
    }
}

/// Process-local storage with no durability
#[derive(Default, Clone)]
pub struct MemoryKvStore {
    items: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryKvStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `items`
    pub fn with_items<K, V>(items: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let items = items.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { items: Arc::new(RwLock::new(items)) }
    }

    /// Copy of everything stored
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.items.read().clone()
    }

    /// Raw value for `key`
    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.read().get(key).cloned()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.read().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> Result<()> {
        self.items.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        self.items.write().remove(key);
        Ok(())
    }
}
