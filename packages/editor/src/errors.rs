//! Error types for the editor

use crate::location::Position;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditError {
    /// Target element, index or template node absent from the current tree.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A location position this operation declines to handle.
    #[error("Unsupported position {position:?} for {operation}")]
    Unsupported {
        operation: &'static str,
        position: Position,
    },

    /// String attribute value no quoting style can carry.
    #[error("Attribute {attribute} value cannot be represented as a quoted literal")]
    UnrepresentableAttribute { attribute: String },

    #[error("Parse error: {0}")]
    Parse(#[from] sourceloom_parser::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document is not file-backed")]
    NotFileBacked,
}

impl EditError {
    pub fn not_found(message: impl Into<String>) -> Self {
        EditError::NotFound(message.into())
    }

    pub fn unsupported(operation: &'static str, position: Position) -> Self {
        EditError::Unsupported {
            operation,
            position,
        }
    }
}
