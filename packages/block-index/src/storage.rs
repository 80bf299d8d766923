//! Storage backends for indexed blocks.

use crate::error::BlockIndexResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sourceloom_common::TemplateNode;
use std::collections::HashMap;

/// One indexed source block: a template node anchored at a resolved path,
/// stamped with the file version and snapshot time that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedBlock {
    /// `resolved_path:line:column`
    pub id: String,
    pub path: String,
    /// Path relative to the index root, when the block lives under it.
    pub relative_path: String,
    pub version: u64,
    /// Epoch millis of the snapshot that produced this block.
    pub timestamp: u64,
    pub template: TemplateNode,
}

/// Durable (or not) storage beneath the in-memory caches.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Replace every block stored for `path` with `blocks`.
    async fn put_blocks(&mut self, path: &str, blocks: Vec<IndexedBlock>) -> BlockIndexResult<()>;

    async fn get(&self, block_id: &str) -> BlockIndexResult<Option<IndexedBlock>>;

    /// Blocks for a path in insertion order.
    async fn list_by_path(&self, path: &str) -> BlockIndexResult<Vec<IndexedBlock>>;

    async fn remove_path(&mut self, path: &str) -> BlockIndexResult<()>;

    async fn clear(&mut self) -> BlockIndexResult<()>;

    async fn close(&mut self) -> BlockIndexResult<()>;
}

/// In-memory backend. Also what `persist_to_disk: false` gets.
#[derive(Default)]
pub struct MemoryBackend {
    blocks: HashMap<String, IndexedBlock>,
    by_path: HashMap<String, Vec<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn put_blocks(&mut self, path: &str, blocks: Vec<IndexedBlock>) -> BlockIndexResult<()> {
        if let Some(old_ids) = self.by_path.remove(path) {
            for id in old_ids {
                self.blocks.remove(&id);
            }
        }
        let ids: Vec<String> = blocks.iter().map(|b| b.id.clone()).collect();
        for block in blocks {
            self.blocks.insert(block.id.clone(), block);
        }
        self.by_path.insert(path.to_string(), ids);
        Ok(())
    }

    async fn get(&self, block_id: &str) -> BlockIndexResult<Option<IndexedBlock>> {
        Ok(self.blocks.get(block_id).cloned())
    }

    async fn list_by_path(&self, path: &str) -> BlockIndexResult<Vec<IndexedBlock>> {
        let ids = self.by_path.get(path).cloned().unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| self.blocks.get(id).cloned())
            .collect())
    }

    async fn remove_path(&mut self, path: &str) -> BlockIndexResult<()> {
        if let Some(ids) = self.by_path.remove(path) {
            for id in ids {
                self.blocks.remove(&id);
            }
        }
        Ok(())
    }

    async fn clear(&mut self) -> BlockIndexResult<()> {
        self.blocks.clear();
        self.by_path.clear();
        Ok(())
    }

    async fn close(&mut self) -> BlockIndexResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sourceloom_common::SourceLocation;

    fn block(path: &str, line: u32) -> IndexedBlock {
        let template = TemplateNode::new(SourceLocation::new(path, line, 0));
        IndexedBlock {
            id: template.element_hash(),
            path: path.to_string(),
            relative_path: path.trim_start_matches('/').to_string(),
            version: 1,
            timestamp: 0,
            template,
        }
    }

    #[tokio::test]
    async fn test_put_blocks_replaces_the_path_set() {
        let mut backend = MemoryBackend::new();
        backend
            .put_blocks("/a.tsx", vec![block("/a.tsx", 1), block("/a.tsx", 2)])
            .await
            .unwrap();
        backend
            .put_blocks("/a.tsx", vec![block("/a.tsx", 3)])
            .await
            .unwrap();

        assert!(backend.get("/a.tsx:1:0").await.unwrap().is_none());
        assert!(backend.get("/a.tsx:3:0").await.unwrap().is_some());
        assert_eq!(backend.list_by_path("/a.tsx").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_paths_are_isolated() {
        let mut backend = MemoryBackend::new();
        backend
            .put_blocks("/a.tsx", vec![block("/a.tsx", 1)])
            .await
            .unwrap();
        backend
            .put_blocks("/b.tsx", vec![block("/b.tsx", 1)])
            .await
            .unwrap();
        backend.remove_path("/a.tsx").await.unwrap();

        assert!(backend.get("/a.tsx:1:0").await.unwrap().is_none());
        assert!(backend.get("/b.tsx:1:0").await.unwrap().is_some());
    }
}
