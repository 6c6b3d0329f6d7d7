//! Per-animation scene: layer instances evaluated frame by frame, their
//! drawables, masks and mattes, and keypath overrides.

use bitflags::bitflags;

pub(crate) mod composition;
pub(crate) mod content;
pub(crate) mod drawable;
pub(crate) mod keypath;
pub(crate) mod layer;
pub(crate) mod mask;
pub(crate) mod render_tree;

pub(crate) use composition::Scene;
pub use keypath::{KeyPath, PropertyKind, PropertyValue};
pub use render_tree::{BrushNode, LayerNode, MaskNode, PathData, RenderTree, ShapeNode, StrokeNode};

bitflags! {
    /// What changed on a node since its last evaluation.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub(crate) struct DirtyFlag: u8 {
        const MATRIX = 1;
        const ALPHA = 1 << 1;
    }
}
