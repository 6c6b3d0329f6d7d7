use std::sync::Arc;

use crate::foundation::core::Color;
use crate::model::animatable::Animatable;
use crate::model::composition::ImageAsset;
use crate::model::content::{ContentItem, ShapeData};
use crate::model::transform::Transform;

/// How a mask combines with the masks before it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MaskMode {
    /// Union.
    #[default]
    Add,
    /// Remove from the accumulated region.
    Subtract,
    /// Keep only the overlap.
    Intersect,
    /// Keep what is covered by exactly one side.
    Difference,
    /// Ignored.
    None,
}

/// Layer mask.
#[derive(Clone, Debug, PartialEq)]
pub struct Mask {
    /// Combination mode.
    pub mode: MaskMode,
    /// Use the area outside the outline.
    pub inverted: bool,
    /// Opacity in percent.
    pub opacity: Animatable<f32>,
    /// Outline in layer space.
    pub shape: Animatable<ShapeData>,
}

impl Mask {
    /// Opacity at `frame` in `[0, 1]`.
    pub fn opacity(&self, frame: f32) -> f32 {
        (self.opacity.value(frame) / 100.0).clamp(0.0, 1.0)
    }

    /// Return `true` when neither outline nor opacity are animated.
    pub fn is_static(&self) -> bool {
        self.opacity.is_static() && self.shape.is_static()
    }
}

/// Track matte applied to a layer by the layer above it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MatteType {
    /// No matte.
    #[default]
    None,
    /// Keep where the matte is opaque.
    Alpha,
    /// Keep where the matte is transparent.
    AlphaInverted,
    /// Keep where the matte is bright.
    Luma,
    /// Keep where the matte is dark.
    LumaInverted,
}

/// Layer type and its type-specific data.
#[derive(Clone, Debug, PartialEq)]
pub enum LayerKind {
    /// Nested composition.
    Precomp {
        /// Asset id the layers come from.
        ref_id: String,
        /// Child layers in document order, shared with every other instance.
        layers: Arc<Vec<Layer>>,
        /// Precomp viewport width.
        width: f32,
        /// Precomp viewport height.
        height: f32,
    },
    /// Filled rectangle.
    Solid {
        /// Width.
        width: f32,
        /// Height.
        height: f32,
        /// Fill color.
        color: Color,
    },
    /// Vector content.
    Shape {
        /// Content items in document order.
        items: Vec<ContentItem>,
    },
    /// Transform-only parent.
    Null,
    /// Bitmap.
    Image {
        /// Resolved asset, `None` when the reference is missing.
        asset: Option<Arc<ImageAsset>>,
    },
    /// Text; renders nothing.
    Text,
}

/// One timeline track.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    /// Author-given name.
    pub name: Option<String>,
    /// `ind` id used by parent references.
    pub index: Option<i64>,
    /// Parent `ind`, resolved when the scene is built.
    pub parent: Option<i64>,
    /// First visible frame.
    pub in_frame: f32,
    /// First frame after the layer disappears.
    pub out_frame: f32,
    /// Offset of the layer's local time.
    pub start_time: f32,
    /// Local time scale factor.
    pub time_stretch: f32,
    /// Time-remap curve in seconds.
    pub time_remap: Option<Animatable<f32>>,
    /// Transform.
    pub transform: Transform,
    /// Masks in document order.
    pub masks: Vec<Mask>,
    /// Matte applied by the layer above.
    pub matte: MatteType,
    /// This layer is the matte of the layer below and is not painted itself.
    pub is_matte_source: bool,
    /// Hidden layers only act as parents.
    pub hidden: bool,
    /// Type-specific data.
    pub kind: LayerKind,
}

impl Layer {
    /// Return `true` when `frame` lies in `[in_frame, out_frame)`.
    pub fn is_visible_at(&self, frame: f32) -> bool {
        frame >= self.in_frame && frame < self.out_frame
    }

    /// Whether the layer's own properties never change.
    pub fn is_static(&self) -> bool {
        let content = match &self.kind {
            LayerKind::Shape { items } => items.iter().all(ContentItem::is_static),
            LayerKind::Precomp { layers, .. } => layers.iter().all(Layer::is_static),
            _ => true,
        };
        content
            && self.transform.is_static()
            && self.time_remap.is_none()
            && self.masks.iter().all(Mask::is_static)
    }

    /// Frame of this layer's children at composition frame `frame`.
    ///
    /// `frame_rate` converts a time-remap curve from seconds to frames.
    pub fn child_frame(&self, frame: f32, frame_rate: f32) -> f32 {
        let stretch = if self.time_stretch > 0.0 {
            self.time_stretch
        } else {
            1.0
        };
        match &self.time_remap {
            Some(remap) => remap.value(frame) * frame_rate / stretch,
            None => (frame - self.start_time) / stretch,
        }
    }
}
