//! Template-node derivation: binding parsed elements to the identity scheme
//! used by the editor and the layer/source mapping manager.

use crate::ast::{Document, ElementNode, Node};
use sourceloom_common::{CoreElementType, SourceLocation, TemplateNode};
use std::collections::HashMap;

/// Build the template node for one parsed element.
///
/// `component` is the enclosing component context, if any. The resulting
/// hash is only valid against the parse that produced `element`; any edit to
/// the file shifts positions and requires re-derivation.
pub fn template_node_for(
    element: &ElementNode,
    file_path: &str,
    component: Option<&str>,
) -> TemplateNode {
    let mut node = TemplateNode::new(SourceLocation::new(
        file_path,
        element.span.line,
        element.span.column,
    ));
    node.component = component.map(|c| c.to_string());
    if element.tag_name.eq_ignore_ascii_case("body") {
        node.core_element_type = Some(CoreElementType::BodyTag);
    }
    node
}

fn is_component_name(tag_name: &str) -> bool {
    tag_name
        .chars()
        .next()
        .map(|c| c.is_ascii_uppercase())
        .unwrap_or(false)
}

/// Walk a parsed document and derive `element_hash -> TemplateNode` for
/// every element, tracking the component context as the walk descends
/// through component instances (uppercase-initial tags).
///
/// `dynamic_type` is never assigned here: it depends on runtime semantics
/// the markup alone cannot express, and is supplied by the rendering-side
/// resolver instead.
pub fn create_template_node_map(doc: &Document, file_path: &str) -> HashMap<String, TemplateNode> {
    let mut mapping = HashMap::new();
    let mut component_stack: Vec<String> = Vec::new();
    for child in &doc.children {
        walk(child, file_path, &mut component_stack, true, &mut mapping);
    }
    mapping
}

fn walk(
    node: &Node,
    file_path: &str,
    component_stack: &mut Vec<String>,
    is_root_child: bool,
    mapping: &mut HashMap<String, TemplateNode>,
) {
    match node {
        Node::Element(element) => {
            let component = component_stack.last().map(|s| s.as_str());
            let mut template_node = template_node_for(element, file_path, component);
            if is_root_child && component.is_some() && template_node.core_element_type.is_none() {
                template_node.core_element_type = Some(CoreElementType::ComponentRoot);
            }
            mapping.insert(template_node.element_hash(), template_node);

            let entered_component = is_component_name(&element.tag_name);
            if entered_component {
                component_stack.push(element.tag_name.clone());
            }
            let mut first_element = true;
            for child in &element.children {
                let child_is_root = entered_component
                    && first_element
                    && matches!(child, Node::Element(_) | Node::Fragment(_));
                if matches!(child, Node::Element(_) | Node::Fragment(_)) {
                    first_element = false;
                }
                walk(child, file_path, component_stack, child_is_root, mapping);
            }
            if entered_component {
                component_stack.pop();
            }
        }
        Node::Fragment(fragment) => {
            for child in &fragment.children {
                walk(child, file_path, component_stack, false, mapping);
            }
        }
        Node::Text(_) | Node::Expression(_) | Node::Comment(_) => {}
    }
}
