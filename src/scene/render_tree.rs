//! Read-only snapshot of the evaluated scene.

use serde::Serialize;

use crate::foundation::core::{Color, Point, affine_scale};
use crate::geometry::{CapStyle, JoinStyle, PathElement, VPath};
use crate::model::{MaskMode, MatteType};
use crate::paint::{Brush, GradientKind, GradientStop};
use crate::raster::FillRule;
use crate::scene::drawable::Drawable;
use crate::scene::layer::{LayerContent, LayerId, LayerTree};

/// Evaluated primitives of one frame at one size.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderTree {
    /// Frame evaluated.
    pub frame: f32,
    /// Viewport width.
    pub width: u32,
    /// Viewport height.
    pub height: u32,
    /// Top-level layers, back to front.
    pub layers: Vec<LayerNode>,
}

/// A visible layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LayerNode {
    /// Layer name.
    pub name: Option<String>,
    /// Combined opacity in `[0, 1]`.
    pub alpha: f32,
    /// Matte applied by the layer above.
    pub matte: MatteType,
    /// Used only as the matte of the layer below.
    pub is_matte_source: bool,
    /// Masks in device space.
    pub masks: Vec<MaskNode>,
    /// Primitives back to front.
    pub shapes: Vec<ShapeNode>,
    /// Precomp children back to front.
    pub children: Vec<LayerNode>,
}

/// One mask outline.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MaskNode {
    /// Combination mode.
    pub mode: MaskMode,
    /// Inverted coverage.
    pub inverted: bool,
    /// Outline.
    pub path: PathData,
}

/// Device-space path in flat form.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PathData {
    /// Commands.
    pub elements: Vec<PathElement>,
    /// Points consumed by the commands in order.
    pub points: Vec<Point>,
}

impl From<&VPath> for PathData {
    fn from(path: &VPath) -> Self {
        Self {
            elements: path.elements().to_vec(),
            points: path.points().to_vec(),
        }
    }
}

/// One painted primitive.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShapeNode {
    /// Outline.
    pub path: PathData,
    /// Winding rule for fills.
    pub fill_rule: FillRule,
    /// Paint.
    pub brush: BrushNode,
    /// Present for strokes.
    pub stroke: Option<StrokeNode>,
}

/// Paint description.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum BrushNode {
    /// Straight-alpha color.
    Solid(Color),
    /// Linear gradient in device space.
    Linear {
        /// Point at offset 0.
        start: Point,
        /// Point at offset 1.
        end: Point,
        /// Stops.
        stops: Vec<GradientStop>,
        /// Extra opacity.
        alpha: f32,
    },
    /// Radial gradient in device space.
    Radial {
        /// Outer circle center.
        center: Point,
        /// Outer circle radius.
        radius: f64,
        /// Point at offset 0.
        focal: Point,
        /// Stops.
        stops: Vec<GradientStop>,
        /// Extra opacity.
        alpha: f32,
    },
    /// Bitmap.
    Image {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// Opacity in `[0, 255]`.
        alpha: u8,
    },
}

/// Stroke parameters in device space.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StrokeNode {
    /// Line width.
    pub width: f64,
    /// End caps.
    pub cap: CapStyle,
    /// Corner joins.
    pub join: JoinStyle,
    /// Miter limit.
    pub miter_limit: f64,
    /// Dash pattern followed by its offset; empty when solid.
    pub dash: Vec<f64>,
}

impl From<&Brush> for BrushNode {
    fn from(brush: &Brush) -> Self {
        match brush {
            Brush::Solid(c) => Self::Solid(*c),
            Brush::Gradient(g) => match g.kind {
                GradientKind::Linear { start, end } => Self::Linear {
                    start: g.transform * start,
                    end: g.transform * end,
                    stops: g.stops.clone(),
                    alpha: g.alpha,
                },
                GradientKind::Radial { center, radius, focal } => Self::Radial {
                    center: g.transform * center,
                    radius: radius * affine_scale(&g.transform),
                    focal: g.transform * focal,
                    stops: g.stops.clone(),
                    alpha: g.alpha,
                },
            },
            Brush::Texture(t) => Self::Image {
                width: t.image.width(),
                height: t.image.height(),
                alpha: t.alpha,
            },
        }
    }
}

fn shape(d: &Drawable) -> ShapeNode {
    ShapeNode {
        path: PathData::from(&d.path),
        fill_rule: d.fill_rule,
        brush: BrushNode::from(&d.brush),
        stroke: d.stroke.as_ref().map(|s| StrokeNode {
            width: s.style.width,
            cap: s.style.cap,
            join: s.style.join,
            miter_limit: s.style.miter_limit,
            dash: s.dash.clone(),
        }),
    }
}

pub(crate) fn layer_nodes(tree: &LayerTree, ids: &[LayerId]) -> Vec<LayerNode> {
    ids.iter()
        .filter_map(|&id| {
            let item = &tree.items[id.0];
            let layer = item.source.layer();
            if !item.visible || layer.hidden {
                return None;
            }
            let mut shapes = Vec::new();
            let mut children = Vec::new();
            match &item.content {
                LayerContent::Shape(content) => {
                    let mut list = Vec::new();
                    content.render_list(&mut list);
                    shapes.extend(list.into_iter().map(shape));
                }
                LayerContent::Solid(d) => shapes.push(shape(d)),
                LayerContent::Image { bitmap: Some(_), drawable } => shapes.push(shape(drawable)),
                LayerContent::Precomp { children: ids, .. } => children = layer_nodes(tree, ids),
                LayerContent::Image { .. } | LayerContent::Null => {}
            }
            Some(LayerNode {
                name: layer.name.clone(),
                alpha: item.alpha,
                matte: layer.matte,
                is_matte_source: layer.is_matte_source,
                masks: item
                    .masks
                    .iter()
                    .map(|m| MaskNode {
                        mode: m.model.mode,
                        inverted: m.model.inverted,
                        path: PathData::from(&m.path),
                    })
                    .collect(),
                shapes,
                children,
            })
        })
        .collect()
}
