//! # Structural edit operations
//!
//! High-level structural operations on one file's parsed markup tree.
//!
//! ## Design principles
//!
//! 1. **Identity by re-derivation**: parents and moved children are matched
//!    by recomputing template-node hashes against the current parse; raw
//!    offsets are never cached across operations.
//! 2. **Filtered indices**: all user-facing indices address the element-only
//!    view; operations translate to raw indices before splicing.
//! 3. **Single-target**: traversal stops at the first parent whose hash
//!    matches; callers issue one request per logical parent.
//! 4. **No partial mutation**: targets and positions are validated before
//!    the raw children array is touched.
//!
//! ## Operation semantics
//!
//! ### Insert
//! - Builds the element recursively from the spec; void tags self-close
//! - String attribute values that no quoting style can carry are rejected
//!   before anything is spliced
//! - Append/Prepend splice into the raw children array
//! - Index/Selector positions are not handled and fail as Unsupported
//!
//! ### Remove
//! - Index resolves as given, Append to the last view member, Prepend to 0
//! - Out-of-range indices fail as NotFound with the tree unmodified
//!
//! ### Move
//! - The child is found by fresh hash, spliced out, tagged with a stable
//!   key attribute if it has none, and re-inserted with the destination
//!   clamped to the post-removal view length
//!
//! ### Group
//! - Targets (ascending) are re-resolved against the live shrinking view
//! - Collected elements keep their original relative order inside the
//!   container, which is inserted at the destination location

use crate::errors::EditError;
use crate::location::{InsertSpec, LocationDescriptor, Position};
use crate::view::{element_view_len, element_view_raw_indices, view_index_to_raw};
use serde::{Deserialize, Serialize};
use sourceloom_common::{element_hash, SourceLocation, TemplateNode};
use sourceloom_parser::{
    get_element_token, Attribute, AttributeValue, Document, ElementNode, Node, Span,
};

/// Tags that never take a closing tag.
pub const VOID_TAGS: [&str; 6] = ["img", "input", "br", "hr", "meta", "link"];

/// Attribute used by list-rendering frameworks to reconcile reordered
/// siblings.
const KEY_ATTRIBUTE: &str = "key";

/// Prefix for keys minted by Move.
const MOVE_KEY_PREFIX: &str = "loom-";

/// Structural edit requests issued by the editor UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditRequest {
    /// Insert a new element built from `spec` into `parent`
    Insert {
        parent: TemplateNode,
        spec: InsertSpec,
        location: LocationDescriptor,
    },

    /// Remove the element at `location` from `parent`
    Remove {
        parent: TemplateNode,
        location: LocationDescriptor,
    },

    /// Move `child` to a new position within `parent`
    Move {
        parent: TemplateNode,
        child: TemplateNode,
        location: LocationDescriptor,
    },

    /// Wrap the targeted siblings of `parent` in a new container element
    Group {
        parent: TemplateNode,
        targets: Vec<LocationDescriptor>,
        container: InsertSpec,
        location: LocationDescriptor,
    },
}

impl EditRequest {
    /// Apply this request to a parsed tree.
    ///
    /// On error the tree is left unmodified; callers cannot observe a
    /// half-applied operation.
    pub fn apply(&self, doc: &mut Document) -> Result<(), EditError> {
        match self {
            EditRequest::Insert {
                parent,
                spec,
                location,
            } => Self::with_parent(doc, parent, |element, _| {
                insert_into(element, spec, location)
            }),

            EditRequest::Remove { parent, location } => {
                Self::with_parent(doc, parent, |element, _| remove_from(element, location))
            }

            EditRequest::Move {
                parent,
                child,
                location,
            } => Self::with_parent(doc, parent, |element, file_path| {
                move_within(element, child, location, file_path)
            }),

            EditRequest::Group {
                parent,
                targets,
                container,
                location,
            } => Self::with_parent(doc, parent, |element, _| {
                group_within(element, targets, container, location)
            }),
        }
    }

    /// Locate the parent by fresh template-node hash and run `action` on it.
    ///
    /// Only the first matching parent anywhere in the tree is targeted per
    /// request; traversal stops as soon as the action has run.
    fn with_parent<F>(doc: &mut Document, parent: &TemplateNode, action: F) -> Result<(), EditError>
    where
        F: FnOnce(&mut ElementNode, &str) -> Result<(), EditError>,
    {
        let target_hash = parent.element_hash();
        let file_path = parent.location.file_path.as_str();

        match find_element_mut(&mut doc.children, &target_hash, file_path) {
            Some(element) => action(element, file_path),
            None => {
                tracing::warn!(hash = %target_hash, "parent element not found in tree");
                Err(EditError::not_found(format!(
                    "no element matching {}",
                    target_hash
                )))
            }
        }
    }
}

/// Recompute the template-node hash of a parsed element against the current
/// snapshot.
fn fresh_hash(element: &ElementNode, file_path: &str) -> String {
    element_hash(&SourceLocation::new(
        file_path,
        element.span.line,
        element.span.column,
    ))
}

fn find_element_mut<'a>(
    nodes: &'a mut [Node],
    target_hash: &str,
    file_path: &str,
) -> Option<&'a mut ElementNode> {
    for node in nodes {
        match node {
            Node::Element(element) => {
                if element.span.is_sourced() && fresh_hash(element, file_path) == target_hash {
                    return Some(element);
                }
                if let Some(found) = find_element_mut(&mut element.children, target_hash, file_path)
                {
                    return Some(found);
                }
            }
            Node::Fragment(fragment) => {
                if let Some(found) =
                    find_element_mut(&mut fragment.children, target_hash, file_path)
                {
                    return Some(found);
                }
            }
            Node::Text(_) | Node::Expression(_) | Node::Comment(_) => {}
        }
    }
    None
}

fn is_void_tag(tag_name: &str) -> bool {
    VOID_TAGS.contains(&tag_name)
}

/// Whether some quoting style can carry this literal. The printer uses
/// double quotes, or single quotes when the value contains a double quote;
/// `<` and `{` terminate a quoted value in either style, and a value
/// holding both quote kinds has no delimiter left.
fn is_representable_literal(value: &str) -> bool {
    if value.contains('<') || value.contains('{') {
        return false;
    }
    !(value.contains('"') && value.contains('\''))
}

/// Build an element (and its subtree) from an insert spec.
///
/// Fails before any mutation happens if a string attribute value cannot
/// survive a print/re-parse round trip as a quoted literal.
fn build_element(spec: &InsertSpec) -> Result<ElementNode, EditError> {
    let mut attributes = Vec::with_capacity(spec.attributes.len());
    for (name, value) in &spec.attributes {
        let value = match value {
            serde_json::Value::String(literal) => {
                if !is_representable_literal(literal) {
                    return Err(EditError::UnrepresentableAttribute {
                        attribute: name.clone(),
                    });
                }
                AttributeValue::Literal(literal.clone())
            }
            other => AttributeValue::Expression(other.to_string()),
        };
        attributes.push(Attribute {
            name: name.clone(),
            value: Some(value),
        });
    }

    let self_closing = is_void_tag(&spec.tag_name);
    let children = if self_closing {
        Vec::new()
    } else {
        let mut children = Vec::with_capacity(spec.children.len());
        for child in &spec.children {
            children.push(Node::Element(build_element(child)?));
        }
        children
    };

    Ok(ElementNode {
        tag_name: spec.tag_name.clone(),
        attributes,
        children,
        self_closing,
        span: Span::synthetic(),
    })
}

fn insert_into(
    parent: &mut ElementNode,
    spec: &InsertSpec,
    location: &LocationDescriptor,
) -> Result<(), EditError> {
    let node = Node::Element(build_element(spec)?);
    match location.position {
        Position::Append => {
            parent.children.push(node);
            Ok(())
        }
        Position::Prepend => {
            parent.children.insert(0, node);
            Ok(())
        }
        Position::Index | Position::Selector => {
            tracing::warn!(position = ?location.position, "insert does not resolve this position");
            Err(EditError::unsupported("insert", location.position))
        }
    }
}

fn remove_from(parent: &mut ElementNode, location: &LocationDescriptor) -> Result<(), EditError> {
    let view_len = element_view_len(&parent.children);

    let view_index = match location.position {
        Position::Index => location
            .index
            .ok_or_else(|| EditError::not_found("remove location carries no index"))?,
        Position::Append => view_len
            .checked_sub(1)
            .ok_or_else(|| EditError::not_found("parent has no element children"))?,
        Position::Prepend => 0,
        Position::Selector => {
            return Err(EditError::unsupported("remove", location.position));
        }
    };

    if view_index >= view_len {
        tracing::warn!(view_index, view_len, "remove index out of range");
        return Err(EditError::not_found(format!(
            "element index {} out of range 0..{}",
            view_index, view_len
        )));
    }

    // Unreachable given the view is derived from the same array; defensive.
    let raw_index = view_index_to_raw(&parent.children, view_index)
        .ok_or_else(|| EditError::not_found("element view member missing from raw children"))?;

    parent.children.remove(raw_index);
    Ok(())
}

fn move_within(
    parent: &mut ElementNode,
    child: &TemplateNode,
    location: &LocationDescriptor,
    file_path: &str,
) -> Result<(), EditError> {
    // Validate the destination before touching the tree.
    let destination = match location.position {
        Position::Index => location
            .index
            .ok_or_else(|| EditError::not_found("move location carries no index"))?,
        Position::Prepend => 0,
        Position::Append => usize::MAX,
        Position::Selector => {
            return Err(EditError::unsupported("move", location.position));
        }
    };

    // The child may have shifted since the caller captured its identity, so
    // its hash is recomputed against the current snapshot.
    let child_hash = child.element_hash();
    let raw_index = parent
        .children
        .iter()
        .position(|node| {
            matches!(node, Node::Element(element) if fresh_hash(element, file_path) == child_hash)
        })
        .ok_or_else(|| {
            tracing::warn!(hash = %child_hash, "move source child not found");
            EditError::not_found(format!("no child matching {}", child_hash))
        })?;

    let mut node = parent.children.remove(raw_index);
    if let Node::Element(element) = &mut node {
        ensure_stable_key(element, file_path);
    }

    let view_len = element_view_len(&parent.children);
    let clamped = destination.min(view_len);
    if clamped == view_len {
        parent.children.push(node);
    } else {
        match view_index_to_raw(&parent.children, clamped) {
            Some(raw_destination) => parent.children.insert(raw_destination, node),
            None => parent.children.push(node),
        }
    }

    Ok(())
}

/// Tag a moved element with a stable key so list-rendering frameworks can
/// reconcile reordered siblings. The token is derived from the element's
/// hash: reproducible per source location, distinct across siblings.
fn ensure_stable_key(element: &mut ElementNode, file_path: &str) {
    if element.has_attribute(KEY_ATTRIBUTE) {
        return;
    }
    let token = get_element_token(&fresh_hash(element, file_path));
    element.attributes.push(Attribute {
        name: KEY_ATTRIBUTE.to_string(),
        value: Some(AttributeValue::Literal(format!(
            "{}{}",
            MOVE_KEY_PREFIX, token
        ))),
    });
}

/// Where a grouped container lands in the parent. Append and Prepend splice
/// the raw array like Insert does; Index addresses the element-only view.
enum ContainerPlacement {
    Append,
    Prepend,
    Index(usize),
}

fn group_within(
    parent: &mut ElementNode,
    targets: &[LocationDescriptor],
    container: &InsertSpec,
    location: &LocationDescriptor,
) -> Result<(), EditError> {
    // Validate the destination and build the container before touching the
    // tree.
    let placement = match location.position {
        Position::Index => ContainerPlacement::Index(
            location
                .index
                .ok_or_else(|| EditError::not_found("group location carries no index"))?,
        ),
        Position::Prepend => ContainerPlacement::Prepend,
        Position::Append => ContainerPlacement::Append,
        Position::Selector => {
            return Err(EditError::unsupported("group", location.position));
        }
    };
    let mut container_element = build_element(container)?;

    // Resolve every target against the live, shrinking view before any raw
    // splice happens: removing target k shifts the indices of the rest, so
    // later targets must be re-resolved, and a bad target must not leave the
    // tree half-grouped.
    let mut view = element_view_raw_indices(&parent.children);
    let mut removed_raw = Vec::with_capacity(targets.len());
    for target in targets {
        let len = view.len();
        let view_index = match target.position {
            Position::Index => target
                .index
                .ok_or_else(|| EditError::not_found("group target carries no index"))?,
            Position::Prepend => 0,
            Position::Append => len
                .checked_sub(1)
                .ok_or_else(|| EditError::not_found("parent has no element children"))?,
            Position::Selector => {
                return Err(EditError::unsupported("group target", target.position));
            }
        };
        if view_index >= len {
            tracing::warn!(view_index, len, "group target index out of range");
            return Err(EditError::not_found(format!(
                "group target index {} out of range 0..{}",
                view_index, len
            )));
        }
        removed_raw.push(view.remove(view_index));
    }

    // Splice out in descending raw order so earlier removals don't shift the
    // rest, then restore original relative order for the container.
    let mut ordered = removed_raw;
    ordered.sort_unstable();
    let mut collected = Vec::with_capacity(ordered.len());
    for &raw_index in ordered.iter().rev() {
        collected.push(parent.children.remove(raw_index));
    }
    collected.reverse();

    // The container holds the collected elements even if its tag would
    // normally self-close.
    container_element.self_closing = false;
    container_element.children = collected;
    let node = Node::Element(container_element);

    match placement {
        ContainerPlacement::Append => parent.children.push(node),
        ContainerPlacement::Prepend => parent.children.insert(0, node),
        ContainerPlacement::Index(index) => {
            let view_len = element_view_len(&parent.children);
            let clamped = index.min(view_len);
            if clamped == view_len {
                parent.children.push(node);
            } else {
                match view_index_to_raw(&parent.children, clamped) {
                    Some(raw_destination) => parent.children.insert(raw_destination, node),
                    None => parent.children.push(node),
                }
            }
        }
    }

    Ok(())
}
