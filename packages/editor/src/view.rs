//! The element-only view of a parent's children.
//!
//! Raw children interleave text/expression/comment nodes that are invisible
//! to the person editing visually, so every user-facing index is an index
//! into the filtered subsequence of element/fragment children. Operations
//! translate a filtered index to a raw index by scanning the raw array and
//! counting view members, then act on the raw array.

use sourceloom_parser::Node;

/// Number of element-view members in a raw children array.
pub fn element_view_len(children: &[Node]) -> usize {
    children
        .iter()
        .filter(|child| child.is_element_view_member())
        .count()
}

/// Translate a filtered view index to its raw array index.
pub fn view_index_to_raw(children: &[Node], view_index: usize) -> Option<usize> {
    children
        .iter()
        .enumerate()
        .filter(|(_, child)| child.is_element_view_member())
        .nth(view_index)
        .map(|(raw_index, _)| raw_index)
}

/// Raw indices of every element-view member, in document order.
pub fn element_view_raw_indices(children: &[Node]) -> Vec<usize> {
    children
        .iter()
        .enumerate()
        .filter(|(_, child)| child.is_element_view_member())
        .map(|(raw_index, _)| raw_index)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sourceloom_parser::{parse, Node};

    fn children_of(source: &str) -> Vec<Node> {
        let doc = parse(source).unwrap();
        match doc.children.into_iter().next().unwrap() {
            Node::Element(e) => e.children,
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    fn test_view_filters_non_elements() {
        let children = children_of("<div>\n  <p>a</p>\n  {expr}\n  <!-- c -->\n  <p>b</p>\n</div>");
        // Raw: text, p, text, expr, text, comment, text, p, text
        assert_eq!(children.len(), 9);
        assert_eq!(element_view_len(&children), 2);
    }

    #[test]
    fn test_view_len_equals_member_count_for_any_tree() {
        // Filtered-index invariant: the view length always equals the count
        // of element/fragment children in the raw array.
        for source in [
            "<div></div>",
            "<div>text only</div>",
            "<div><p>a</p><p>b</p></div>",
            "<div>{x}<><i>f</i></>{y}<p>c</p></div>",
        ] {
            let children = children_of(source);
            let members = children
                .iter()
                .filter(|c| c.is_element_view_member())
                .count();
            assert_eq!(element_view_len(&children), members);
        }
    }

    #[test]
    fn test_view_index_to_raw() {
        let children = children_of("<div>\n  <p>a</p>\n  <p>b</p>\n</div>");
        // Raw: text, p, text, p, text
        assert_eq!(view_index_to_raw(&children, 0), Some(1));
        assert_eq!(view_index_to_raw(&children, 1), Some(3));
        assert_eq!(view_index_to_raw(&children, 2), None);
    }

    #[test]
    fn test_fragment_counts_as_view_member() {
        let children = children_of("<div><p>a</p><>frag</><p>b</p></div>");
        assert_eq!(element_view_len(&children), 3);
        assert_eq!(element_view_raw_indices(&children), vec![0, 1, 2]);
    }
}
