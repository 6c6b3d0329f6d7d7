//! Immutable animation model produced by parsing.

pub(crate) mod animatable;
pub(crate) mod composition;
pub(crate) mod content;
pub(crate) mod layer;
pub(crate) mod parser;
pub(crate) mod transform;

pub use animatable::{Animatable, Interpolator, Keyframe, Lerp, Tangents};
pub use composition::{Asset, Composition, ImageAsset, ImageSource, Marker};
pub use content::{
    ContentItem, Dash, EllipseShape, Fill, GradientData, GradientFill, GradientParams,
    GradientStroke, GradientType, Group, ItemInfo, PathShape, Polystar, PolystarKind, RectShape,
    Repeater, ShapeData, Stroke, StrokeParams, Trim, TrimMode,
};
pub use layer::{Layer, LayerKind, Mask, MaskMode, MatteType};
pub use transform::{Position, Transform};
