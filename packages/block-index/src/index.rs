//! The versioned block index.
//!
//! Sits between file snapshots (produced by the parser after each edit or
//! watch event) and everything that needs to resolve a block id quickly:
//! an LRU cache in front of the storage backend, plus a negative cache of
//! ids known to have disappeared so repeated lookups of stale ids never
//! touch storage.

use crate::config::BlockIndexConfig;
use crate::error::{BlockIndexError, BlockIndexResult};
use crate::events::{BlockIndexEvent, Listener};
use crate::storage::{IndexedBlock, MemoryBackend, StorageBackend};
use lru::LruCache;
use sourceloom_common::TemplateNode;
use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Version record for one indexed file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileVersionInfo {
    /// Resolved path the record describes.
    pub path: String,
    pub version: u64,
    pub block_count: usize,
    pub updated_at_ms: u64,
}

struct IndexState {
    backend: Box<dyn StorageBackend>,
    cache: LruCache<String, IndexedBlock>,
    negative: HashSet<String>,
    versions: HashMap<String, FileVersionInfo>,
}

pub struct BlockIndex {
    root_dir: PathBuf,
    config: BlockIndexConfig,
    state: Option<IndexState>,
    listeners: Vec<Listener>,
}

impl BlockIndex {
    pub fn new(root_dir: PathBuf, config: BlockIndexConfig) -> Self {
        Self {
            root_dir,
            config,
            state: None,
            listeners: Vec::new(),
        }
    }

    /// Initialize with the default in-memory backend.
    pub async fn init(&mut self) -> BlockIndexResult<()> {
        self.init_with(Box::new(MemoryBackend::new())).await
    }

    /// Initialize with a caller-supplied backend.
    pub async fn init_with(&mut self, backend: Box<dyn StorageBackend>) -> BlockIndexResult<()> {
        let capacity =
            NonZeroUsize::new(self.config.max_memory_items.max(1)).unwrap_or(NonZeroUsize::MIN);
        self.state = Some(IndexState {
            backend,
            cache: LruCache::new(capacity),
            negative: HashSet::new(),
            versions: HashMap::new(),
        });
        tracing::debug!(
            root = %self.root_dir.display(),
            name = self.config.name.as_deref().unwrap_or(&self.config.indexed_db_name),
            "block index initialized"
        );
        Ok(())
    }

    pub fn on(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    /// Replace the blocks for one file with a fresh snapshot.
    ///
    /// Bumps the path's version, invalidates ids that disappeared (each
    /// emitting `block-invalidated` before the final `snapshot-applied`),
    /// and returns the new version.
    pub async fn apply_file_snapshot(
        &mut self,
        path: &str,
        blocks: &[TemplateNode],
        now_ms: Option<u64>,
    ) -> BlockIndexResult<u64> {
        let resolved = self.resolve_path(path);
        let relative = self.relative_path(&resolved);
        let timestamp = now_ms.unwrap_or_else(current_time_ms);
        let state = self.state.as_mut().ok_or(BlockIndexError::Uninitialized)?;

        let version = state
            .versions
            .get(&resolved)
            .map(|info| info.version)
            .unwrap_or(0)
            + 1;

        let old_ids: Vec<String> = state
            .backend
            .list_by_path(&resolved)
            .await?
            .into_iter()
            .map(|block| block.id)
            .collect();

        let indexed: Vec<IndexedBlock> = blocks
            .iter()
            .map(|template| IndexedBlock {
                id: format!(
                    "{}:{}:{}",
                    resolved, template.location.line, template.location.column
                ),
                path: resolved.clone(),
                relative_path: relative.clone(),
                version,
                timestamp,
                template: template.clone(),
            })
            .collect();
        let new_ids: Vec<String> = indexed.iter().map(|block| block.id.clone()).collect();
        let new_id_set: HashSet<&str> = new_ids.iter().map(String::as_str).collect();

        state.backend.put_blocks(&resolved, indexed.clone()).await?;

        for block in indexed {
            state.negative.remove(&block.id);
            state.cache.put(block.id.clone(), block);
        }

        let mut invalidated = Vec::new();
        for old_id in old_ids {
            if !new_id_set.contains(old_id.as_str()) {
                state.cache.pop(&old_id);
                state.negative.insert(old_id.clone());
                invalidated.push(old_id);
            }
        }

        state.versions.insert(
            resolved.clone(),
            FileVersionInfo {
                path: resolved.clone(),
                version,
                block_count: new_ids.len(),
                updated_at_ms: timestamp,
            },
        );

        tracing::debug!(
            path = %resolved,
            version,
            blocks = new_ids.len(),
            invalidated = invalidated.len(),
            "applied file snapshot"
        );

        for block_id in invalidated {
            self.emit(&BlockIndexEvent::BlockInvalidated { block_id });
        }
        self.emit(&BlockIndexEvent::SnapshotApplied {
            path: resolved,
            version,
            block_ids: new_ids,
            timestamp,
        });

        Ok(version)
    }

    /// Resolve a block id.
    ///
    /// Negative-cache hits short-circuit before any storage call; memory
    /// cache hits come next; storage is the last resort and refills the
    /// cache.
    pub async fn resolve(&mut self, block_id: &str) -> BlockIndexResult<Option<IndexedBlock>> {
        let state = self.state.as_mut().ok_or(BlockIndexError::Uninitialized)?;

        if state.negative.contains(block_id) {
            return Ok(None);
        }
        if let Some(block) = state.cache.get(block_id) {
            return Ok(Some(block.clone()));
        }
        let found = state.backend.get(block_id).await?;
        if let Some(block) = &found {
            state.cache.put(block_id.to_string(), block.clone());
        }
        Ok(found)
    }

    pub async fn list_by_path(&self, path: &str) -> BlockIndexResult<Vec<IndexedBlock>> {
        let resolved = self.resolve_path(path);
        let state = self.state.as_ref().ok_or(BlockIndexError::Uninitialized)?;
        state.backend.list_by_path(&resolved).await
    }

    /// Current version of a path, 0 when unknown.
    pub fn get_file_version(&self, path: &str) -> BlockIndexResult<u64> {
        let resolved = self.resolve_path(path);
        let state = self.state.as_ref().ok_or(BlockIndexError::Uninitialized)?;
        Ok(state
            .versions
            .get(&resolved)
            .map(|info| info.version)
            .unwrap_or(0))
    }

    pub fn get_file_version_info(&self, path: &str) -> BlockIndexResult<Option<FileVersionInfo>> {
        let resolved = self.resolve_path(path);
        let state = self.state.as_ref().ok_or(BlockIndexError::Uninitialized)?;
        Ok(state.versions.get(&resolved).cloned())
    }

    /// Reset versions, caches and storage.
    pub async fn clear(&mut self) -> BlockIndexResult<()> {
        let state = self.state.as_mut().ok_or(BlockIndexError::Uninitialized)?;
        state.backend.clear().await?;
        state.cache.clear();
        state.negative.clear();
        state.versions.clear();
        self.emit(&BlockIndexEvent::CacheCleared {
            timestamp: current_time_ms(),
        });
        Ok(())
    }

    /// Close the backend; the index returns to the uninitialized state.
    pub async fn close(&mut self) -> BlockIndexResult<()> {
        let mut state = self.state.take().ok_or(BlockIndexError::Uninitialized)?;
        state.backend.close().await
    }

    fn resolve_path(&self, path: &str) -> String {
        let p = Path::new(path);
        if p.is_absolute() {
            path.to_string()
        } else {
            self.root_dir.join(p).display().to_string()
        }
    }

    /// Inverse of `resolve_path` for paths under the root; paths outside it
    /// stay as given.
    fn relative_path(&self, resolved: &str) -> String {
        Path::new(resolved)
            .strip_prefix(&self.root_dir)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| resolved.to_string())
    }

    fn emit(&self, event: &BlockIndexEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

fn current_time_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
