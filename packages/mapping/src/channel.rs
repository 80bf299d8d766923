//! Channel to the rendering side of a frame.
//!
//! The manager never talks to a renderer directly; it asks the channel to
//! resolve identities and pushes classification/instance updates through
//! it. Implementations typically bridge to an embedded webview or a
//! devtools protocol session.

use async_trait::async_trait;
use sourceloom_common::{CoreElementType, DynamicType, TemplateNode};

/// Outcome of a successful instance resolution at a component boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceResolution {
    pub instance_id: String,
    pub component: Option<String>,
}

#[async_trait]
pub trait FrameChannel: Send + Sync {
    /// Look up the template node behind an oid, if the source side still
    /// knows it.
    async fn resolve_template_node(&self, oid: &str) -> Option<TemplateNode>;

    /// Ask for the instance identity of `child` rendered under the
    /// component that owns `parent`, where `ordinal` is the zero-based
    /// occurrence index of the rendered element among the parent's live
    /// descendants sharing the child's oid, in document order.
    async fn resolve_instance(
        &self,
        parent: &TemplateNode,
        child: &TemplateNode,
        ordinal: usize,
    ) -> Option<InstanceResolution>;

    /// Notify the frame of a layer's classification.
    async fn set_element_type(
        &self,
        dom_id: &str,
        dynamic_type: Option<DynamicType>,
        core_element_type: Option<CoreElementType>,
    );

    /// Notify the frame that a layer resolved to a component instance.
    async fn update_element_instance(
        &self,
        dom_id: &str,
        instance_id: &str,
        component: Option<&str>,
    );
}
