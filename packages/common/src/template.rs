//! Template node identity: the binding between one rendered element and the
//! source location of its start tag at the time of last parse.

use serde::{Deserialize, Serialize};

/// Anchor of a start tag in a source file.
///
/// `line` is 1-based, `column` is 0-based, both measured at the time of the
/// last parse. Positions shift whenever the file is edited, so a
/// SourceLocation is only meaningful against the snapshot it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub file_path: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file_path: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file_path: file_path.into(),
            line,
            column,
        }
    }
}

/// Classification of an element whose presence in the rendered tree depends
/// on runtime state (list rendering, conditionals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DynamicType {
    Array,
    Conditional,
}

/// Classification of elements with special structural roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CoreElementType {
    ComponentRoot,
    BodyTag,
}

/// Identity of one rendered element's origin in source.
///
/// Value object: cheap to clone and safe to share. Re-derived by re-parsing
/// the file and locating the tag again; never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateNode {
    pub location: SourceLocation,

    /// Name of the component context this element sits in, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_type: Option<DynamicType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub core_element_type: Option<CoreElementType>,
}

impl TemplateNode {
    pub fn new(location: SourceLocation) -> Self {
        Self {
            location,
            component: None,
            dynamic_type: None,
            core_element_type: None,
        }
    }

    /// Stable-for-one-snapshot identity key: `filePath:line:column`.
    ///
    /// Unique per (file, parse) pair. NOT stable across edits to the same
    /// file; callers must re-derive after every mutation.
    pub fn element_hash(&self) -> String {
        element_hash(&self.location)
    }
}

/// Compute the element hash for a source location.
pub fn element_hash(location: &SourceLocation) -> String {
    format!(
        "{}:{}:{}",
        location.file_path, location.line, location.column
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_hash_format() {
        let node = TemplateNode::new(SourceLocation::new("/src/page.tsx", 12, 4));
        assert_eq!(node.element_hash(), "/src/page.tsx:12:4");
    }

    #[test]
    fn test_template_node_serialization_round_trip() {
        let mut node = TemplateNode::new(SourceLocation::new("/src/app.tsx", 3, 0));
        node.component = Some("Card".to_string());
        node.core_element_type = Some(CoreElementType::ComponentRoot);

        let json = serde_json::to_string(&node).unwrap();
        let back: TemplateNode = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
    }

    #[test]
    fn test_wire_field_names_are_camel_case() {
        let node = TemplateNode::new(SourceLocation::new("/a.tsx", 1, 0));
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains("\"filePath\""));
        assert!(!json.contains("\"file_path\""));
    }
}
