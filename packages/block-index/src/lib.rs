//! # Sourceloom Block Index
//!
//! Versioned index of source blocks (template nodes keyed by
//! `path:line:column`) with an LRU cache and a negative cache in front of
//! a pluggable storage backend.
//!
//! The editor feeds it one snapshot per file parse; everything that needs
//! to resolve a block id (mapping, tooling) reads through it without
//! re-parsing.

mod config;
mod error;
mod events;
mod index;
mod storage;

pub use config::BlockIndexConfig;
pub use error::{BlockIndexError, BlockIndexResult};
pub use events::{BlockIndexEvent, Listener};
pub use index::{BlockIndex, FileVersionInfo};
pub use storage::{IndexedBlock, MemoryBackend, StorageBackend};
