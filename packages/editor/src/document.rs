//! Document lifecycle: load source, apply edit requests, regenerate text.
//!
//! A `Document` owns one file's source text and its parse. Every applied
//! edit regenerates the text and re-parses it, so spans (and therefore
//! template-node hashes) always describe the current text; callers issuing
//! a sequence of edits re-derive their target hashes between steps.

use crate::errors::EditError;
use crate::mutations::EditRequest;
use sourceloom_common::TemplateNode;
use sourceloom_parser::{create_template_node_map, parse, serialize, Document as MarkupDocument};
use std::collections::HashMap;
use std::path::PathBuf;

/// Where a document's bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStorage {
    /// In-memory only; `save` is an error.
    Memory,
    /// Backed by a file on disk.
    File(PathBuf),
}

/// One open source file under edit.
#[derive(Debug)]
pub struct Document {
    storage: DocumentStorage,
    /// Logical path used in template-node hashes. For file-backed documents
    /// this is the path's display form; for in-memory documents the caller
    /// supplies it.
    file_path: String,
    source: String,
    tree: MarkupDocument,
    version: u64,
    dirty: bool,
}

impl Document {
    /// Open an in-memory document from source text.
    pub fn from_source(file_path: impl Into<String>, source: impl Into<String>) -> Result<Self, EditError> {
        let source = source.into();
        let tree = parse(&source)?;
        Ok(Self {
            storage: DocumentStorage::Memory,
            file_path: file_path.into(),
            source,
            tree,
            version: 1,
            dirty: false,
        })
    }

    /// Open a file-backed document.
    pub fn load(path: PathBuf) -> Result<Self, EditError> {
        let source = std::fs::read_to_string(&path)?;
        let file_path = path.display().to_string();
        let tree = parse(&source)?;
        tracing::debug!(path = %file_path, bytes = source.len(), "loaded document");
        Ok(Self {
            storage: DocumentStorage::File(path),
            file_path,
            source,
            tree,
            version: 1,
            dirty: false,
        })
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// Current text, regenerated after the last applied edit.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tree(&self) -> &MarkupDocument {
        &self.tree
    }

    /// Monotonic per-document version; bumped on every applied edit.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether the document has edits not yet written to storage.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Template-node identities for the current parse, keyed by element
    /// hash. Invalidated by the next applied edit.
    pub fn template_nodes(&self) -> HashMap<String, TemplateNode> {
        create_template_node_map(&self.tree, &self.file_path)
    }

    /// Apply one edit request and regenerate the source text.
    ///
    /// On success the document is re-parsed so spans describe the new text.
    /// On error nothing changes: not the text, not the tree, not the
    /// version. The edit runs against a scratch tree and both the text and
    /// the re-parse are committed together, so a failure at any stage
    /// leaves the document on its last good state.
    pub fn apply(&mut self, request: &EditRequest) -> Result<(), EditError> {
        let mut tree = self.tree.clone();
        request.apply(&mut tree)?;
        let source = serialize(&tree);
        let tree = parse(&source)?;

        self.source = source;
        self.tree = tree;
        self.version += 1;
        self.dirty = true;
        tracing::debug!(path = %self.file_path, version = self.version, "applied edit");
        Ok(())
    }

    /// Write the current text back to the backing file.
    pub fn save(&mut self) -> Result<(), EditError> {
        match &self.storage {
            DocumentStorage::File(path) => {
                std::fs::write(path, &self.source)?;
                self.dirty = false;
                tracing::debug!(path = %path.display(), "saved document");
                Ok(())
            }
            DocumentStorage::Memory => Err(EditError::NotFileBacked),
        }
    }
}
