use crate::ast::*;

/// Serializer converts a markup tree back to source text.
///
/// Text, expression and comment nodes are emitted verbatim from their stored
/// content, so subtrees that no edit touched round-trip byte-identically.
/// Elements are printed structurally from their current attribute list and
/// children; an edited element is therefore re-printed with canonical
/// spacing inside its tags, and nothing outside it changes.
pub struct Serializer;

/// Serialize a document to source text.
pub fn serialize(doc: &Document) -> String {
    Serializer::new().serialize(doc)
}

impl Serializer {
    pub fn new() -> Self {
        Self
    }

    pub fn serialize(&self, doc: &Document) -> String {
        let mut output = String::new();
        for child in &doc.children {
            self.serialize_node(child, &mut output);
        }
        output
    }

    pub fn serialize_node(&self, node: &Node, output: &mut String) {
        match node {
            Node::Element(element) => self.serialize_element(element, output),
            Node::Fragment(fragment) => {
                output.push_str("<>");
                for child in &fragment.children {
                    self.serialize_node(child, output);
                }
                output.push_str("</>");
            }
            Node::Text(text) => output.push_str(&text.content),
            Node::Expression(expr) => {
                output.push('{');
                output.push_str(&expr.content);
                output.push('}');
            }
            Node::Comment(comment) => {
                output.push_str("<!--");
                output.push_str(&comment.content);
                output.push_str("-->");
            }
        }
    }

    fn serialize_element(&self, element: &ElementNode, output: &mut String) {
        output.push('<');
        output.push_str(&element.tag_name);

        for attribute in &element.attributes {
            output.push(' ');
            output.push_str(&attribute.name);
            match &attribute.value {
                Some(AttributeValue::Literal(value)) => {
                    // Double quotes unless the value itself contains one.
                    let quote = if value.contains('"') { '\'' } else { '"' };
                    output.push('=');
                    output.push(quote);
                    output.push_str(value);
                    output.push(quote);
                }
                Some(AttributeValue::Expression(expr)) => {
                    output.push_str("={");
                    output.push_str(expr);
                    output.push('}');
                }
                None => {}
            }
        }

        if element.self_closing {
            output.push_str("/>");
            return;
        }

        output.push('>');
        for child in &element.children {
            self.serialize_node(child, output);
        }
        output.push_str("</");
        output.push_str(&element.tag_name);
        output.push('>');
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_round_trip_is_byte_identical() {
        let source = "<div class=\"card\">\n  <h1>Title</h1>\n  {items.map(i => i)}\n  <!-- trailing -->\n</div>\n";
        let doc = parse(source).unwrap();
        assert_eq!(serialize(&doc), source);
    }

    #[test]
    fn test_round_trip_self_closing_and_flags() {
        let source = "<form>\n  <input name=\"q\" disabled/>\n  <br/>\n</form>";
        let doc = parse(source).unwrap();
        assert_eq!(serialize(&doc), source);
    }

    #[test]
    fn test_round_trip_fragment() {
        let source = "<>\n  <p>a</p>\n  <p>b</p>\n</>";
        let doc = parse(source).unwrap();
        assert_eq!(serialize(&doc), source);
    }

    #[test]
    fn test_quote_bearing_literal_uses_single_quotes() {
        let source = "<p title='say \"hi\"'>x</p>";
        let doc = parse(source).unwrap();
        assert_eq!(serialize(&doc), source);
    }

    #[test]
    fn test_round_trip_expression_attribute() {
        let source = "<Card items={list.filter(x => { return x.ok })}>body</Card>";
        let doc = parse(source).unwrap();
        assert_eq!(serialize(&doc), source);
    }
}
