use serde::{Deserialize, Serialize};

/// Source span of a node, anchored at its start tag.
///
/// `start`/`end` are byte offsets into the source of the last parse.
/// `line` is 1-based and `column` 0-based, measured at `start`. All of these
/// are invalidated by any edit to the file; the tree owning this span is
/// destroyed and re-parsed rather than patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Synthetic span for nodes built in memory (inserted elements).
    pub fn synthetic() -> Self {
        Self {
            start: 0,
            end: 0,
            line: 0,
            column: 0,
        }
    }

    /// Whether this node came from a parse rather than an edit.
    pub fn is_sourced(&self) -> bool {
        self.line > 0
    }
}

/// Root of one file's parsed markup tree.
///
/// Exclusively owned by the in-memory parse for one edit operation; there is
/// no sharing of trees across concurrent edits of the same file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub children: Vec<Node>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// A child in the raw children array.
///
/// Raw children interleave text/expression/comment nodes invisible to the
/// person editing visually; user-facing indices are always computed over the
/// element-only view, never over this enum directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    Element(ElementNode),
    Fragment(FragmentNode),
    Text(TextNode),
    Expression(ExpressionNode),
    Comment(CommentNode),
}

impl Node {
    /// Whether this node is a member of the element-only view.
    pub fn is_element_view_member(&self) -> bool {
        matches!(self, Node::Element(_) | Node::Fragment(_))
    }

    pub fn span(&self) -> &Span {
        match self {
            Node::Element(n) => &n.span,
            Node::Fragment(n) => &n.span,
            Node::Text(n) => &n.span,
            Node::Expression(n) => &n.span,
            Node::Comment(n) => &n.span,
        }
    }
}

/// An element: `<tag attr="v" other={expr}>children</tag>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementNode {
    pub tag_name: String,
    /// Ordered attribute list; order is preserved through printing.
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
    pub self_closing: bool,
    pub span: Span,
}

impl ElementNode {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }
}

/// A fragment: `<>children</>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentNode {
    pub children: Vec<Node>,
    pub span: Span,
}

/// Verbatim text between tags, whitespace included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub content: String,
    pub span: Span,
}

/// A `{ ... }` expression container; content captured verbatim without the
/// outer braces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionNode {
    pub content: String,
    pub span: Span,
}

/// A `<!-- ... -->` comment; content captured verbatim without delimiters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentNode {
    pub content: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    /// None for bare flag attributes (`<input disabled>`).
    pub value: Option<AttributeValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum AttributeValue {
    /// Quoted literal, stored without quotes.
    Literal(String),
    /// Braced expression, stored without braces.
    Expression(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_view_membership() {
        let element = Node::Element(ElementNode {
            tag_name: "div".into(),
            attributes: vec![],
            children: vec![],
            self_closing: false,
            span: Span::synthetic(),
        });
        let text = Node::Text(TextNode {
            content: "  ".into(),
            span: Span::synthetic(),
        });
        assert!(element.is_element_view_member());
        assert!(!text.is_element_view_member());
    }

    #[test]
    fn test_synthetic_span_is_not_sourced() {
        assert!(!Span::synthetic().is_sourced());
        assert!(Span::new(0, 5, 1, 0).is_sourced());
    }
}
