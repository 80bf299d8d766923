//! # Sourceloom Parser
//!
//! Structural parser/printer for the markup dialect edited by the visual
//! editor. Parses source text into a raw-children markup tree, prints a
//! mutated tree back to text, and derives template-node identities from
//! start-tag positions.
//!
//! Text, expression and comment children are stored verbatim, so printing a
//! tree whose untouched subtrees were never mutated reproduces their
//! original bytes. That is the whole formatting-preservation contract:
//! edits stay minimal because only the touched structure is re-printed.

pub mod ast;
pub mod error;
pub mod id_generator;
pub mod parser;
pub mod serializer;
pub mod template_node;
pub mod tokenizer;

pub use ast::{Attribute, AttributeValue, Document, ElementNode, FragmentNode, Node, Span};
pub use error::{ParseError, ParseResult};
pub use id_generator::get_element_token;
pub use parser::{parse, Parser};
pub use serializer::{serialize, Serializer};
pub use template_node::{create_template_node_map, template_node_for};
pub use tokenizer::{tokenize, Token};
