//! Layer records: one entry per rendered DOM element in a frame.

use serde::{Deserialize, Serialize};
use sourceloom_common::{CoreElementType, DynamicType};
use std::collections::HashMap;

/// One rendered element in a frame's layer tree.
///
/// `oid` is the template-node hash of the markup element this layer
/// renders; it is how the visual side and the source side name the same
/// thing. Layers inside third-party or runtime-generated markup carry no
/// oid and are skipped by processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerNode {
    pub dom_id: String,
    pub tag_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Child dom ids in document order.
    #[serde(default)]
    pub children: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oid: Option<String>,

    /// Identity of the component instance this element belongs to, once
    /// resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_type: Option<DynamicType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_element_type: Option<CoreElementType>,
}

impl LayerNode {
    pub fn new(dom_id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            dom_id: dom_id.into(),
            tag_name: tag_name.into(),
            parent: None,
            children: Vec::new(),
            oid: None,
            instance_id: None,
            component: None,
            dynamic_type: None,
            core_element_type: None,
        }
    }
}

/// Layer map for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameMap {
    pub frame_id: String,
    pub root_dom_id: String,
    pub nodes: HashMap<String, LayerNode>,
}

impl FrameMap {
    pub fn new(
        frame_id: impl Into<String>,
        root_dom_id: impl Into<String>,
        nodes: HashMap<String, LayerNode>,
    ) -> Self {
        Self {
            frame_id: frame_id.into(),
            root_dom_id: root_dom_id.into(),
            nodes,
        }
    }

    pub fn get(&self, dom_id: &str) -> Option<&LayerNode> {
        self.nodes.get(dom_id)
    }

    /// Merge incoming nodes into the map, replacing entries that share a
    /// dom id and keeping everything else.
    pub fn merge(&mut self, nodes: HashMap<String, LayerNode>) {
        self.nodes.extend(nodes);
    }
}
