//! Storage layer for Daily Manna
//!
//! This crate provides the key-value persistence adapter, the snapshot
//! envelope written under each storage key, and the write-behind queue.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod kv;
pub mod persistence;

pub use kv::{KeyValueStore, KvConfig, KvError, MemoryKvStore, SledKvStore};
pub use persistence::{
    decode_snapshot, encode_snapshot, read_raw, reject_migration, PersistenceConfig,
    PersistenceError, WriteBehind, WriteOp,
};
