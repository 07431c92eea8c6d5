//! Persisted store
//!
//! A [`PersistedStore`] holds one slice of application state in memory and
//! mirrors it to a single storage key. Mutations apply synchronously; the
//! durable copy is written behind them through a [`WriteBehind`] queue.
//!
//! On creation the store loads its key once in the background. Until that
//! finishes, reads return defaults and [`PersistedStore::is_hydrated`] is
//! `false`. Hydration always completes: a missing key, unreadable snapshot,
//! adapter failure or timeout leaves the defaults in place.

use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use storage::persistence::{self, PersistenceConfig, PersistenceError, WriteBehind};
use storage::KeyValueStore;
use tokio::sync::watch;

/// Store-related errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Persistence setup failed
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// A slice of state that can live in a [`PersistedStore`]
pub trait PersistedSlice: Clone + Default + Send + Sync + 'static {
    /// The persisted projection of this state
    type Snapshot: Serialize + DeserializeOwned;

    /// Storage key owned exclusively by this slice
    const STORAGE_KEY: &'static str;

    /// Snapshot schema version
    const VERSION: u32 = 0;

    /// Fields to persist
    fn partialize(&self) -> Self::Snapshot;

    /// Apply a loaded snapshot on top of the current state
    fn merge(&mut self, snapshot: Self::Snapshot);

    /// Restore invariants after any change, loaded or local
    fn normalize(&mut self) {}

    /// Runs after every hydration, whether or not a snapshot was found
    fn on_rehydrate(&mut self) {}

    /// Upgrade a snapshot written under an older [`VERSION`](Self::VERSION)
    fn migrate(
        from_version: u32,
        state: serde_json::Value,
    ) -> persistence::Result<serde_json::Value> {
        persistence::reject_migration(Self::VERSION)(from_version, state)
    }
}

/// In-memory state mirrored to one storage key
pub struct PersistedStore<S: PersistedSlice> {
    state: Arc<RwLock<S>>,
    hydrated: Arc<watch::Sender<bool>>,
    revision: Arc<watch::Sender<u64>>,
    resets: Arc<AtomicU64>,
    writer: Option<WriteBehind>,
}

impl<S: PersistedSlice> Clone for PersistedStore<S> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            hydrated: Arc::clone(&self.hydrated),
            revision: Arc::clone(&self.revision),
            resets: Arc::clone(&self.resets),
            writer: self.writer.clone(),
        }
    }
}

impl<S: PersistedSlice> PersistedStore<S> {
    /// Create a store backed by `kv` and start hydrating it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(kv: Arc<dyn KeyValueStore>, config: &PersistenceConfig) -> Result<Self> {
        let writer = WriteBehind::new(Arc::clone(&kv), S::STORAGE_KEY, config)?;
        let store = Self::build(S::default(), false, Some(writer));

        let task_store = store.clone();
        let read_timeout = config.read_timeout;
        let resets_at_open = store.resets.load(Ordering::Acquire);
        tokio::spawn(async move {
            task_store.hydrate(kv.as_ref(), read_timeout, resets_at_open).await;
        });

        Ok(store)
    }

    /// Create a store that never touches storage and is hydrated immediately
    pub fn detached() -> Self {
        Self::detached_with(S::default())
    }

    /// Like [`detached`](Self::detached), starting from `state`
    pub fn detached_with(state: S) -> Self {
        Self::build(state, true, None)
    }

    fn build(state: S, hydrated: bool, writer: Option<WriteBehind>) -> Self {
        let (hydrated, _) = watch::channel(hydrated);
        let (revision, _) = watch::channel(0);

        Self {
            state: Arc::new(RwLock::new(state)),
            hydrated: Arc::new(hydrated),
            revision: Arc::new(revision),
            resets: Arc::new(AtomicU64::new(0)),
            writer,
        }
    }

    async fn hydrate(
        &self,
        kv: &dyn KeyValueStore,
        read_timeout: Option<Duration>,
        resets_at_open: u64,
    ) {
        let key = S::STORAGE_KEY;

        let loaded = match persistence::read_raw(kv, key, read_timeout).await {
            Ok(Some(raw)) => {
                match persistence::decode_snapshot::<S::Snapshot, _>(&raw, S::VERSION, S::migrate)
                {
                    Ok(snapshot) => Some(snapshot),
                    Err(e) => {
                        tracing::warn!(key, error = %e, "discarding unreadable snapshot");
                        None
                    }
                }
            }
            Ok(None) => {
                tracing::debug!(key, "no stored snapshot");
                None
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read stored snapshot");
                None
            }
        };

        {
            let mut state = self.state.write();
            // A reset while loading deleted the key; the snapshot is stale.
            let superseded = self.resets.load(Ordering::Acquire) != resets_at_open;
            match loaded {
                Some(snapshot) if !superseded => {
                    state.merge(snapshot);
                    state.normalize();
                }
                Some(_) => tracing::debug!(key, "store reset during hydration, snapshot dropped"),
                None => {}
            }
            state.on_rehydrate();
        }

        self.hydrated.send_replace(true);
        self.bump_revision();
        tracing::debug!(key, "store hydrated");
    }

    /// Storage key this store owns
    pub fn storage_key(&self) -> &'static str {
        S::STORAGE_KEY
    }

    /// Copy of the current state. Defaults until hydrated.
    pub fn get(&self) -> S {
        self.state.read().clone()
    }

    /// Read the current state without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.state.read())
    }

    /// Replace the whole state
    pub fn set(&self, new_state: S) {
        self.update(|state| *state = new_state);
    }

    /// Mutate the state in place and persist the result.
    ///
    /// `f` runs under the state lock and must not call back into this store.
    pub fn update<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let result = {
            let mut state = self.state.write();
            let result = f(&mut state);
            state.normalize();
            self.persist(&state);
            result
        };
        self.bump_revision();
        result
    }

    /// Like [`update`](Self::update), but only persists and notifies when
    /// `f` reports a change
    pub fn update_if(&self, f: impl FnOnce(&mut S) -> bool) -> bool {
        let changed = {
            let mut state = self.state.write();
            let changed = f(&mut state);
            if changed {
                state.normalize();
                self.persist(&state);
            }
            changed
        };
        if changed {
            self.bump_revision();
        }
        changed
    }

    /// Return to defaults and delete the storage key
    pub fn reset(&self) {
        {
            let mut state = self.state.write();
            *state = S::default();
            self.resets.fetch_add(1, Ordering::AcqRel);
            if let Some(writer) = &self.writer {
                writer.submit_remove();
            }
        }
        self.bump_revision();
    }

    fn persist(&self, state: &S) {
        let Some(writer) = &self.writer else {
            return;
        };

        match persistence::encode_snapshot(&state.partialize(), S::VERSION) {
            Ok(raw) => writer.submit_set(raw),
            Err(e) => {
                tracing::error!(key = S::STORAGE_KEY, error = %e, "failed to serialize state");
            }
        }
    }

    fn bump_revision(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    /// Whether the stored snapshot (or its absence) has been applied
    pub fn is_hydrated(&self) -> bool {
        *self.hydrated.borrow()
    }

    /// Receiver that flips to `true` once hydration completes
    pub fn hydration(&self) -> watch::Receiver<bool> {
        self.hydrated.subscribe()
    }

    /// Wait for hydration to complete
    pub async fn wait_hydrated(&self) {
        let mut hydrated = self.hydrated.subscribe();
        // The sender is owned by `self`, so it outlives this wait.
        let _ = hydrated.wait_for(|hydrated| *hydrated).await;
    }

    /// Receiver notified after every change to the state
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Wait until queued writes have reached storage
    pub async fn flush(&self) {
        if let Some(writer) = &self.writer {
            writer.flush().await;
        }
    }

    /// Whether this store mirrors to storage
    pub fn is_persistent(&self) -> bool {
        self.writer.is_some()
    }
}
