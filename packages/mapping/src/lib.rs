//! # Sourceloom Mapping
//!
//! Keeps the layer tree of each rendered frame bound to source identities.
//!
//! A frame reports its rendered DOM as a flat map of [`LayerNode`]s; the
//! [`MappingManager`] walks that map in document order, resolves each
//! layer's template node through the frame's [`FrameChannel`], propagates
//! dynamic/core classifications, and resolves component instances by
//! walking ancestor component boundaries.

mod channel;
mod error;
mod layers;
mod manager;

pub use channel::{FrameChannel, InstanceResolution};
pub use error::MappingError;
pub use layers::{FrameMap, LayerNode};
pub use manager::MappingManager;
