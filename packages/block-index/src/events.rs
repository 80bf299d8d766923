//! Index lifecycle events.
//!
//! Listeners are plain callbacks invoked synchronously inside the emitting
//! call, in registration order; dispatch never reorders or batches events.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BlockIndexEvent {
    /// A file snapshot replaced the path's blocks.
    #[serde(rename_all = "camelCase")]
    SnapshotApplied {
        path: String,
        version: u64,
        block_ids: Vec<String>,
        timestamp: u64,
    },

    /// A block id disappeared from its file and entered the negative cache.
    #[serde(rename_all = "camelCase")]
    BlockInvalidated { block_id: String },

    /// All caches and storage were reset.
    #[serde(rename_all = "camelCase")]
    CacheCleared { timestamp: u64 },
}

pub type Listener = Box<dyn Fn(&BlockIndexEvent) + Send + Sync>;
