//! # Sourceloom Editor
//!
//! Structural edit operations for the visual editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: source text → markup tree           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document lifecycle + edit requests  │
//! │  - Locate parents by template-node hash     │
//! │  - Insert / Remove / Move / Group           │
//! │  - Regenerate source, preserve formatting   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ caller: writes text back / re-renders       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core principles
//!
//! 1. **One tree, one writer**: each operation owns one in-memory parse of
//!    one file; callers serialize edits per file.
//! 2. **Identity by re-derivation**: targets are matched by recomputing
//!    template-node hashes against the current parse, never by cached
//!    offsets.
//! 3. **No partial mutation**: an operation either applies fully or returns
//!    a typed error with the tree untouched.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sourceloom_editor::{Document, EditRequest, LocationDescriptor};
//!
//! let mut doc = Document::load("page.tsx".into())?;
//! let request = EditRequest::Remove {
//!     parent: parent_template_node,
//!     location: LocationDescriptor::at_index(2),
//! };
//! doc.apply(&request)?;
//! doc.save()?;
//! ```

mod document;
mod errors;
mod location;
mod mutations;
mod view;

pub use document::{Document, DocumentStorage};
pub use errors::EditError;
pub use location::{InsertSpec, LocationDescriptor, Position};
pub use mutations::{EditRequest, VOID_TAGS};
pub use view::{element_view_len, view_index_to_raw};

// Re-export the parsed-tree type for convenience
pub use sourceloom_parser::Document as MarkupDocument;
