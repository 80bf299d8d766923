//! Index configuration.

use serde::{Deserialize, Serialize};

fn default_max_memory_items() -> usize {
    10_000
}

fn default_persist_to_disk() -> bool {
    true
}

fn default_db_name() -> String {
    "sourceloom-block-index".to_string()
}

fn default_db_version() -> u32 {
    1
}

/// Configuration for a [`crate::BlockIndex`].
///
/// The `indexed_db_*` fields parameterize the storage backend (database
/// name and schema version); backends that don't persist ignore them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockIndexConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Capacity of the in-memory LRU cache.
    #[serde(default = "default_max_memory_items")]
    pub max_memory_items: usize,

    #[serde(default = "default_persist_to_disk")]
    pub persist_to_disk: bool,

    #[serde(default = "default_db_name")]
    pub indexed_db_name: String,

    #[serde(default = "default_db_version")]
    pub indexed_db_version: u32,
}

impl Default for BlockIndexConfig {
    fn default() -> Self {
        Self {
            name: None,
            max_memory_items: default_max_memory_items(),
            persist_to_disk: default_persist_to_disk(),
            indexed_db_name: default_db_name(),
            indexed_db_version: default_db_version(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_wire_fields() {
        let config: BlockIndexConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BlockIndexConfig::default());
        assert_eq!(config.max_memory_items, 10_000);
        assert!(config.persist_to_disk);
        assert_eq!(config.indexed_db_name, "sourceloom-block-index");
        assert_eq!(config.indexed_db_version, 1);
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let json =
            r#"{"name":"main","maxMemoryItems":5,"persistToDisk":false,"indexedDbName":"x","indexedDbVersion":2}"#;
        let config: BlockIndexConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.name.as_deref(), Some("main"));
        assert_eq!(config.max_memory_items, 5);
        assert!(!config.persist_to_disk);
    }
}
