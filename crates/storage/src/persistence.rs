//! Data persistence layer
//!
//! This module provides the snapshot envelope written under each storage key
//! and the per-key write-behind queue that keeps durable content in step with
//! the latest in-memory state.

use crate::kv::{KeyValueStore, KvError};
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::watch;

/// Persistence error types
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Adapter error
    #[error("Storage error: {0}")]
    Kv(#[from] KvError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Version mismatch
    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected version
        expected: u32,
        /// Found version
        found: u32,
    },

    /// Migration failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Read or write did not finish in time
    #[error("Timed out waiting on key: {0}")]
    Timeout(String),

    /// No tokio runtime to run background writes on
    #[error("No async runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// Result type for persistence operations
pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Persistence configuration
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    /// Upper bound on the hydration read (None waits forever)
    pub read_timeout: Option<Duration>,
    /// Upper bound on each background write (None waits forever)
    pub write_timeout: Option<Duration>,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            read_timeout: Some(Duration::from_secs(5)),
            write_timeout: Some(Duration::from_secs(5)),
        }
    }
}

impl PersistenceConfig {
    /// Create a configuration with default timeouts
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hydration read timeout
    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the per-write timeout
    pub fn write_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.write_timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a, T> {
    state: &'a T,
    version: u32,
}

#[derive(Deserialize)]
struct RawSnapshot {
    state: serde_json::Value,
    #[serde(default)]
    version: u32,
}

/// Serialize `state` into the `{"state": ..., "version": N}` envelope
pub fn encode_snapshot<T: Serialize>(state: &T, version: u32) -> Result<String> {
    Ok(serde_json::to_string(&SnapshotRef { state, version })?)
}

/// Parse an envelope written by [`encode_snapshot`].
///
/// When the stored version differs from `version`, `migrate` receives the
/// stored version and raw state and must return state in the current shape.
pub fn decode_snapshot<T, F>(raw: &str, version: u32, migrate: F) -> Result<T>
where
    T: DeserializeOwned,
    F: FnOnce(u32, serde_json::Value) -> Result<serde_json::Value>,
{
    let snapshot: RawSnapshot = serde_json::from_str(raw)?;

    let state = if snapshot.version == version {
        snapshot.state
    } else {
        migrate(snapshot.version, snapshot.state)?
    };

    Ok(serde_json::from_value(state)?)
}

/// Migration hook that accepts no version but the current one
pub fn reject_migration(
    expected: u32,
) -> impl FnOnce(u32, serde_json::Value) -> Result<serde_json::Value> {
    move |found, _| Err(PersistenceError::VersionMismatch { expected, found })
}

/// One-shot read of `key`, bounded by `timeout`
pub async fn read_raw(
    kv: &dyn KeyValueStore,
    key: &str,
    timeout: Option<Duration>,
) -> Result<Option<String>> {
    bounded(timeout, key, kv.get_item(key)).await
}

async fn bounded<T, F>(timeout: Option<Duration>, key: &str, fut: F) -> Result<T>
where
    F: Future<Output = crate::kv::Result<T>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| PersistenceError::Timeout(key.to_string()))?
            .map_err(Into::into),
        None => fut.await.map_err(Into::into),
    }
}

/// A pending durable operation for one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Replace the stored value
    Set(String),
    /// Delete the key
    Remove,
}

#[derive(Default)]
struct WriteQueue {
    next: Option<WriteOp>,
    running: bool,
}

struct WriterInner {
    kv: Arc<dyn KeyValueStore>,
    key: String,
    write_timeout: Option<Duration>,
    queue: Mutex<WriteQueue>,
    idle: watch::Sender<bool>,
    runtime: Handle,
}

/// Single-flight write-behind queue for one storage key.
///
/// At most one operation runs against the adapter at a time. Submitting while
/// an operation is queued but not started replaces it, so the last submitted
/// operation is always the last one applied.
#[derive(Clone)]
pub struct WriteBehind {
    inner: Arc<WriterInner>,
}

impl WriteBehind {
    /// Create a writer for `key`, running on the current tokio runtime
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        config: &PersistenceConfig,
    ) -> Result<Self> {
        let runtime = Handle::try_current()?;
        let (idle, _) = watch::channel(true);

        Ok(Self {
            inner: Arc::new(WriterInner {
                kv,
                key: key.into(),
                write_timeout: config.write_timeout,
                queue: Mutex::new(WriteQueue::default()),
                idle,
                runtime,
            }),
        })
    }

    /// Storage key this writer owns
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Queue `op` without waiting for it
    pub fn submit(&self, op: WriteOp) {
        let mut queue = self.inner.queue.lock();

        if queue.next.replace(op).is_some() {
            tracing::trace!(key = %self.inner.key, "superseded queued write");
        }

        if !queue.running {
            queue.running = true;
            self.inner.idle.send_replace(false);
            let inner = Arc::clone(&self.inner);
            self.inner.runtime.spawn(inner.drain());
        }
    }

    /// Queue a replacement of the stored value
    pub fn submit_set(&self, value: String) {
        self.submit(WriteOp::Set(value));
    }

    /// Queue a deletion of the key
    pub fn submit_remove(&self) {
        self.submit(WriteOp::Remove);
    }

    /// Whether nothing is queued or running
    pub fn is_idle(&self) -> bool {
        *self.inner.idle.borrow()
    }

    /// Wait until every submitted operation has finished (or failed)
    pub async fn flush(&self) {
        let mut idle = self.inner.idle.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = idle.wait_for(|idle| *idle).await;
    }
}

impl WriterInner {
    async fn drain(self: Arc<Self>) {
        loop {
            let op = {
                let mut queue = self.queue.lock();
                match queue.next.take() {
                    Some(op) => op,
                    None => {
                        queue.running = false;
                        self.idle.send_replace(true);
                        return;
                    }
                }
            };

            if let Err(e) = self.apply(op).await {
                tracing::warn!(key = %self.key, error = %e, "failed to persist state");
            }
        }
    }

    async fn apply(&self, op: WriteOp) -> Result<()> {
        match op {
            WriteOp::Set(value) => {
                bounded(self.write_timeout, &self.key, self.kv.set_item(&self.key, value)).await
            }
            WriteOp::Remove => {
                bounded(self.write_timeout, &self.key, self.kv.remove_item(&self.key)).await
            }
        }
    }
}
