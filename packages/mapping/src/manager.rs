//! The mapping manager: keeps per-frame layer maps in sync with source
//! identities.
//!
//! Processing visits layers in document order (iterative DFS, children
//! pushed in reverse), parent before children. Each visit resolves the
//! layer's template node, propagates classification, and attempts instance
//! resolution by walking up the ancestor chain to the nearest component
//! boundary. Resolutions are awaited one at a time in traversal order so
//! frame notifications arrive deterministically; a failed resolution is
//! logged and never aborts the traversal.

use crate::channel::{FrameChannel, InstanceResolution};
use crate::error::MappingError;
use crate::layers::{FrameMap, LayerNode};
use sourceloom_common::TemplateNode;
use std::collections::HashMap;

#[derive(Default)]
pub struct MappingManager {
    frames: HashMap<String, FrameMap>,
}

impl MappingManager {
    pub fn new() -> Self {
        Self {
            frames: HashMap::new(),
        }
    }

    /// Install a fresh layer map for a frame and process every layer from
    /// the root. Any previous map for the frame is discarded.
    pub async fn set_map_root(
        &mut self,
        frame_id: &str,
        root_dom_id: &str,
        nodes: HashMap<String, LayerNode>,
        channel: &dyn FrameChannel,
    ) {
        tracing::debug!(frame_id, layers = nodes.len(), "installing layer map");
        self.frames.insert(
            frame_id.to_string(),
            FrameMap::new(frame_id, root_dom_id, nodes),
        );
        let root = root_dom_id.to_string();
        self.process_from(frame_id, &root, channel).await;
    }

    /// Merge new layers into a frame's map and process from `start_dom_id`.
    pub async fn update_map(
        &mut self,
        frame_id: &str,
        nodes: HashMap<String, LayerNode>,
        start_dom_id: &str,
        channel: &dyn FrameChannel,
    ) -> Result<(), MappingError> {
        let map = self
            .frames
            .get_mut(frame_id)
            .ok_or_else(|| MappingError::UnknownFrame(frame_id.to_string()))?;
        tracing::debug!(frame_id, incoming = nodes.len(), "merging layer map");
        map.merge(nodes);
        self.process_from(frame_id, start_dom_id, channel).await;
        Ok(())
    }

    /// Look up a processed layer.
    pub fn layer(&self, frame_id: &str, dom_id: &str) -> Option<&LayerNode> {
        self.frames.get(frame_id).and_then(|map| map.get(dom_id))
    }

    pub fn frame(&self, frame_id: &str) -> Option<&FrameMap> {
        self.frames.get(frame_id)
    }

    pub fn remove_frame(&mut self, frame_id: &str) -> Option<FrameMap> {
        self.frames.remove(frame_id)
    }

    async fn process_from(&mut self, frame_id: &str, start_dom_id: &str, channel: &dyn FrameChannel) {
        let Some(map) = self.frames.get_mut(frame_id) else {
            return;
        };

        let mut stack = vec![start_dom_id.to_string()];
        while let Some(dom_id) = stack.pop() {
            let children = match map.nodes.get(&dom_id) {
                Some(node) => node.children.clone(),
                None => {
                    tracing::warn!(frame_id, dom_id, "layer missing from map");
                    continue;
                }
            };

            process_layer(map, &dom_id, channel).await;

            // Reverse push keeps the visit in document order.
            for child in children.iter().rev() {
                stack.push(child.clone());
            }
        }
    }
}

async fn process_layer(map: &mut FrameMap, dom_id: &str, channel: &dyn FrameChannel) {
    let Some(oid) = map.nodes.get(dom_id).and_then(|node| node.oid.clone()) else {
        // Runtime-generated layers carry no source identity.
        return;
    };

    let Some(template) = channel.resolve_template_node(&oid).await else {
        tracing::debug!(dom_id, oid = %oid, "no template node for oid");
        return;
    };

    if let Some(node) = map.nodes.get_mut(dom_id) {
        node.dynamic_type = template.dynamic_type;
        node.core_element_type = template.core_element_type;
    }
    // Only templates that declare a classification are worth a round trip.
    if template.dynamic_type.is_some() || template.core_element_type.is_some() {
        channel
            .set_element_type(dom_id, template.dynamic_type, template.core_element_type)
            .await;
    }

    if let Some(resolution) = resolve_instance(map, dom_id, &oid, &template, channel).await {
        if let Some(node) = map.nodes.get_mut(dom_id) {
            node.instance_id = Some(resolution.instance_id.clone());
            node.component = resolution.component.clone();
        }
        channel
            .update_element_instance(dom_id, &resolution.instance_id, resolution.component.as_deref())
            .await;
    }
}

/// Walk up the ancestor chain; at each component boundary, ask the channel
/// to resolve the instance. `None` from one boundary means "try the next
/// one up"; an exhausted chain leaves the layer addressable only at
/// component granularity.
async fn resolve_instance(
    map: &FrameMap,
    dom_id: &str,
    oid: &str,
    template: &TemplateNode,
    channel: &dyn FrameChannel,
) -> Option<InstanceResolution> {
    let child_component = template.component.as_deref();
    let mut current = map.nodes.get(dom_id).and_then(|node| node.parent.clone());

    while let Some(parent_id) = current {
        let Some(parent_node) = map.nodes.get(&parent_id) else {
            break;
        };

        if let Some(parent_oid) = &parent_node.oid {
            if let Some(parent_template) = channel.resolve_template_node(parent_oid).await {
                if parent_template.component.as_deref() != child_component {
                    let ordinal = ordinal_under(map, &parent_id, dom_id, oid);
                    match channel.resolve_instance(&parent_template, template, ordinal).await {
                        Some(resolution) => return Some(resolution),
                        None => {
                            tracing::debug!(
                                dom_id,
                                parent = %parent_id,
                                ordinal,
                                "instance unresolved at boundary, walking up"
                            );
                        }
                    }
                }
            }
        }

        current = parent_node.parent.clone();
    }

    None
}

/// Zero-based occurrence index of `target_dom_id` among `ancestor_id`'s
/// live descendants sharing `oid`, in document order.
fn ordinal_under(map: &FrameMap, ancestor_id: &str, target_dom_id: &str, oid: &str) -> usize {
    let mut count = 0;
    let mut stack: Vec<String> = map
        .nodes
        .get(ancestor_id)
        .map(|node| node.children.iter().rev().cloned().collect())
        .unwrap_or_default();

    while let Some(dom_id) = stack.pop() {
        let Some(node) = map.nodes.get(&dom_id) else {
            continue;
        };
        if node.oid.as_deref() == Some(oid) {
            if dom_id == target_dom_id {
                return count;
            }
            count += 1;
        }
        for child in node.children.iter().rev() {
            stack.push(child.clone());
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::InstanceResolution;
    use async_trait::async_trait;
    use sourceloom_common::{CoreElementType, DynamicType, SourceLocation};
    use std::sync::Mutex;

    /// Scripted channel: serves template nodes and instance resolutions
    /// from fixed tables, recording every call.
    #[derive(Default)]
    struct ScriptedChannel {
        templates: HashMap<String, TemplateNode>,
        /// (child oid, ordinal) → resolution
        instances: HashMap<(String, usize), InstanceResolution>,
        type_notifications: Mutex<Vec<String>>,
        instance_calls: Mutex<Vec<(String, String, usize)>>,
    }

    impl ScriptedChannel {
        fn with_template(mut self, oid: &str, template: TemplateNode) -> Self {
            self.templates.insert(oid.to_string(), template);
            self
        }

        fn with_instance(mut self, child_oid: &str, ordinal: usize, instance_id: &str) -> Self {
            self.instances.insert(
                (child_oid.to_string(), ordinal),
                InstanceResolution {
                    instance_id: instance_id.to_string(),
                    component: Some("Card".to_string()),
                },
            );
            self
        }
    }

    #[async_trait]
    impl FrameChannel for ScriptedChannel {
        async fn resolve_template_node(&self, oid: &str) -> Option<TemplateNode> {
            self.templates.get(oid).cloned()
        }

        async fn resolve_instance(
            &self,
            parent: &TemplateNode,
            child: &TemplateNode,
            ordinal: usize,
        ) -> Option<InstanceResolution> {
            self.instance_calls.lock().unwrap().push((
                parent.element_hash(),
                child.element_hash(),
                ordinal,
            ));
            self.instances.get(&(child.element_hash(), ordinal)).cloned()
        }

        async fn set_element_type(
            &self,
            dom_id: &str,
            _dynamic_type: Option<DynamicType>,
            _core_element_type: Option<CoreElementType>,
        ) {
            self.type_notifications
                .lock()
                .unwrap()
                .push(dom_id.to_string());
        }

        async fn update_element_instance(
            &self,
            _dom_id: &str,
            _instance_id: &str,
            _component: Option<&str>,
        ) {
        }
    }

    fn template(line: u32, column: u32) -> TemplateNode {
        TemplateNode::new(SourceLocation::new("/page.tsx", line, column))
    }

    fn typed_template(line: u32, column: u32) -> TemplateNode {
        let mut node = template(line, column);
        node.dynamic_type = Some(DynamicType::Conditional);
        node
    }

    fn layer(dom_id: &str, parent: Option<&str>, children: &[&str], oid: Option<&str>) -> LayerNode {
        let mut node = LayerNode::new(dom_id, "div");
        node.parent = parent.map(str::to_string);
        node.children = children.iter().map(|c| c.to_string()).collect();
        node.oid = oid.map(str::to_string);
        node
    }

    fn map_of(nodes: Vec<LayerNode>) -> HashMap<String, LayerNode> {
        nodes
            .into_iter()
            .map(|node| (node.dom_id.clone(), node))
            .collect()
    }

    #[tokio::test]
    async fn test_processing_visits_layers_in_document_order() {
        let nodes = map_of(vec![
            layer("root", None, &["a", "b"], Some("/page.tsx:1:0")),
            layer("a", Some("root"), &["a1"], Some("/page.tsx:2:2")),
            layer("a1", Some("a"), &[], Some("/page.tsx:3:4")),
            layer("b", Some("root"), &[], Some("/page.tsx:5:2")),
        ]);
        let channel = ScriptedChannel::default()
            .with_template("/page.tsx:1:0", typed_template(1, 0))
            .with_template("/page.tsx:2:2", typed_template(2, 2))
            .with_template("/page.tsx:3:4", typed_template(3, 4))
            .with_template("/page.tsx:5:2", typed_template(5, 2));

        let mut manager = MappingManager::new();
        manager.set_map_root("frame-1", "root", nodes, &channel).await;

        assert_eq!(
            *channel.type_notifications.lock().unwrap(),
            vec!["root", "a", "a1", "b"]
        );
    }

    #[tokio::test]
    async fn test_undeclared_classification_sends_no_type_notification() {
        let nodes = map_of(vec![
            layer("root", None, &["a"], Some("/page.tsx:1:0")),
            layer("a", Some("root"), &[], Some("/page.tsx:2:2")),
        ]);
        // Only the root template declares a type.
        let channel = ScriptedChannel::default()
            .with_template("/page.tsx:1:0", typed_template(1, 0))
            .with_template("/page.tsx:2:2", template(2, 2));

        let mut manager = MappingManager::new();
        manager.set_map_root("frame-1", "root", nodes, &channel).await;

        assert_eq!(*channel.type_notifications.lock().unwrap(), vec!["root"]);
        // The untyped layer was still processed and mirrors its template.
        let a = manager.layer("frame-1", "a").unwrap();
        assert_eq!(a.dynamic_type, None);
        assert_eq!(a.core_element_type, None);
    }

    #[tokio::test]
    async fn test_classification_propagates_onto_layers() {
        let nodes = map_of(vec![layer("root", None, &[], Some("/page.tsx:1:0"))]);
        let mut body = template(1, 0);
        body.dynamic_type = Some(DynamicType::Array);
        body.core_element_type = Some(CoreElementType::BodyTag);
        let channel = ScriptedChannel::default().with_template("/page.tsx:1:0", body);

        let mut manager = MappingManager::new();
        manager.set_map_root("frame-1", "root", nodes, &channel).await;

        let processed = manager.layer("frame-1", "root").unwrap();
        assert_eq!(processed.dynamic_type, Some(DynamicType::Array));
        assert_eq!(processed.core_element_type, Some(CoreElementType::BodyTag));
    }

    #[tokio::test]
    async fn test_second_sibling_sharing_oid_resolves_with_ordinal_one() {
        // Three rendered copies of the same source element under one
        // component boundary.
        let child_oid = "/page.tsx:4:4";
        let nodes = map_of(vec![
            layer("root", None, &["c0", "c1", "c2"], Some("/page.tsx:1:0")),
            layer("c0", Some("root"), &[], Some(child_oid)),
            layer("c1", Some("root"), &[], Some(child_oid)),
            layer("c2", Some("root"), &[], Some(child_oid)),
        ]);

        let mut root_template = template(1, 0);
        root_template.component = Some("Page".to_string());
        let mut child_template = template(4, 4);
        child_template.component = Some("Card".to_string());

        let channel = ScriptedChannel::default()
            .with_template("/page.tsx:1:0", root_template)
            .with_template(child_oid, child_template)
            .with_instance(child_oid, 0, "inst-0")
            .with_instance(child_oid, 1, "inst-1")
            .with_instance(child_oid, 2, "inst-2");

        let mut manager = MappingManager::new();
        manager.set_map_root("frame-1", "root", nodes, &channel).await;

        let calls = channel.instance_calls.lock().unwrap();
        let ordinals: Vec<usize> = calls
            .iter()
            .filter(|(_, child, _)| child == child_oid)
            .map(|(_, _, ordinal)| *ordinal)
            .collect();
        assert_eq!(ordinals, vec![0, 1, 2]);
        drop(calls);

        assert_eq!(
            manager.layer("frame-1", "c1").unwrap().instance_id.as_deref(),
            Some("inst-1")
        );
    }

    #[tokio::test]
    async fn test_unresolved_boundary_walks_up_the_chain() {
        // inner boundary yields nothing; the outer one resolves.
        let nodes = map_of(vec![
            layer("outer", None, &["inner"], Some("/page.tsx:1:0")),
            layer("inner", Some("outer"), &["leaf"], Some("/page.tsx:3:2")),
            layer("leaf", Some("inner"), &[], Some("/page.tsx:5:4")),
        ]);

        let mut outer_template = template(1, 0);
        outer_template.component = Some("App".to_string());
        let mut inner_template = template(3, 2);
        inner_template.component = Some("Section".to_string());
        let mut leaf_template = template(5, 4);
        leaf_template.component = Some("Leaf".to_string());

        struct OuterOnly(ScriptedChannel);

        #[async_trait]
        impl FrameChannel for OuterOnly {
            async fn resolve_template_node(&self, oid: &str) -> Option<TemplateNode> {
                self.0.resolve_template_node(oid).await
            }
            async fn resolve_instance(
                &self,
                parent: &TemplateNode,
                child: &TemplateNode,
                ordinal: usize,
            ) -> Option<InstanceResolution> {
                self.0
                    .instance_calls
                    .lock()
                    .unwrap()
                    .push((parent.element_hash(), child.element_hash(), ordinal));
                if parent.element_hash() == "/page.tsx:1:0" && child.element_hash() == "/page.tsx:5:4" {
                    Some(InstanceResolution {
                        instance_id: "inst-outer".to_string(),
                        component: Some("App".to_string()),
                    })
                } else {
                    None
                }
            }
            async fn set_element_type(
                &self,
                dom_id: &str,
                dynamic_type: Option<DynamicType>,
                core_element_type: Option<CoreElementType>,
            ) {
                self.0.set_element_type(dom_id, dynamic_type, core_element_type).await
            }
            async fn update_element_instance(
                &self,
                _dom_id: &str,
                _instance_id: &str,
                _component: Option<&str>,
            ) {
            }
        }

        let channel = OuterOnly(
            ScriptedChannel::default()
                .with_template("/page.tsx:1:0", outer_template)
                .with_template("/page.tsx:3:2", inner_template)
                .with_template("/page.tsx:5:4", leaf_template),
        );

        let mut manager = MappingManager::new();
        manager.set_map_root("frame-1", "outer", nodes, &channel).await;

        assert_eq!(
            manager.layer("frame-1", "leaf").unwrap().instance_id.as_deref(),
            Some("inst-outer")
        );

        // The leaf asked the inner boundary first, then walked up.
        let calls = channel.0.instance_calls.lock().unwrap();
        let leaf_parents: Vec<&str> = calls
            .iter()
            .filter(|(_, child, _)| child == "/page.tsx:5:4")
            .map(|(parent, _, _)| parent.as_str())
            .collect();
        assert_eq!(leaf_parents, vec!["/page.tsx:3:2", "/page.tsx:1:0"]);
    }

    #[tokio::test]
    async fn test_layers_without_oid_are_skipped() {
        let nodes = map_of(vec![
            layer("root", None, &["runtime"], Some("/page.tsx:1:0")),
            layer("runtime", Some("root"), &[], None),
        ]);
        let channel =
            ScriptedChannel::default().with_template("/page.tsx:1:0", typed_template(1, 0));

        let mut manager = MappingManager::new();
        manager.set_map_root("frame-1", "root", nodes, &channel).await;

        assert_eq!(*channel.type_notifications.lock().unwrap(), vec!["root"]);
    }

    #[tokio::test]
    async fn test_update_map_merges_and_reprocesses_subtree() {
        let nodes = map_of(vec![
            layer("root", None, &["a"], Some("/page.tsx:1:0")),
            layer("a", Some("root"), &[], Some("/page.tsx:2:2")),
        ]);
        let channel = ScriptedChannel::default()
            .with_template("/page.tsx:1:0", typed_template(1, 0))
            .with_template("/page.tsx:2:2", typed_template(2, 2))
            .with_template("/page.tsx:3:2", typed_template(3, 2));

        let mut manager = MappingManager::new();
        manager.set_map_root("frame-1", "root", nodes, &channel).await;
        channel.type_notifications.lock().unwrap().clear();

        // A re-render replaced "a" and added a sibling.
        let incoming = map_of(vec![
            layer("root", None, &["a", "b"], Some("/page.tsx:1:0")),
            layer("b", Some("root"), &[], Some("/page.tsx:3:2")),
        ]);
        manager
            .update_map("frame-1", incoming, "b", &channel)
            .await
            .unwrap();

        assert_eq!(*channel.type_notifications.lock().unwrap(), vec!["b"]);
        assert_eq!(manager.frame("frame-1").unwrap().nodes.len(), 3);
    }

    #[tokio::test]
    async fn test_update_map_unknown_frame_is_an_error() {
        let channel = ScriptedChannel::default();
        let mut manager = MappingManager::new();
        let result = manager
            .update_map("missing", HashMap::new(), "root", &channel)
            .await;
        assert!(matches!(result, Err(MappingError::UnknownFrame(_))));
    }
}
