use bitflags::bitflags;

use crate::foundation::core::IRect;
use crate::geometry::{Dasher, StrokeStyle, VPath};
use crate::paint::Brush;
use crate::raster::{FillRule, Rasterizer, VRle};

bitflags! {
    /// What changed on a drawable since it was last rasterized.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub(crate) struct DrawableDirty: u8 {
        const PATH = 1;
        const BRUSH = 1 << 1;
        const STROKE = 1 << 2;
    }
}

/// Stroke parameters in device space.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct StrokeInfo {
    pub(crate) style: StrokeStyle,
    /// Dasher input, empty for solid lines.
    pub(crate) dash: Vec<f64>,
}

/// One paintable primitive: a device-space path, how to cover it and with what.
#[derive(Clone, Debug, Default)]
pub(crate) struct Drawable {
    pub(crate) path: VPath,
    pub(crate) brush: Brush,
    pub(crate) fill_rule: FillRule,
    pub(crate) stroke: Option<StrokeInfo>,
    pub(crate) dirty: DrawableDirty,
    pub(crate) rle: VRle,
    // Clip the cached coverage was computed against.
    raster_clip: Option<IRect>,
}

impl Drawable {
    pub(crate) fn set_path(&mut self, path: VPath) {
        self.path = path;
        self.dirty |= DrawableDirty::PATH;
    }

    pub(crate) fn set_brush(&mut self, brush: Brush) {
        if self.brush != brush {
            self.brush = brush;
            self.dirty |= DrawableDirty::BRUSH;
        }
    }

    pub(crate) fn set_fill_rule(&mut self, rule: FillRule) {
        if self.fill_rule != rule {
            self.fill_rule = rule;
            self.dirty |= DrawableDirty::PATH;
        }
    }

    pub(crate) fn set_stroke(&mut self, stroke: Option<StrokeInfo>) {
        if self.stroke != stroke {
            self.stroke = stroke;
            self.dirty |= DrawableDirty::STROKE;
        }
    }

    /// Return `true` when the cached coverage is stale for `clip`.
    pub(crate) fn needs_raster(&self, clip: IRect) -> bool {
        self.raster_clip != Some(clip) || self.dirty.intersects(DrawableDirty::PATH | DrawableDirty::STROKE)
    }

    /// Recompute the coverage if the geometry changed, then clear the dirty bits.
    pub(crate) fn rasterize(&mut self, clip: IRect) {
        if self.needs_raster(clip) {
            let mut rasterizer = Rasterizer::new();
            self.rle = match &self.stroke {
                Some(stroke) if stroke.style.width > 0.0 => {
                    if stroke.dash.len() >= 2 {
                        let dashed = Dasher::new(&stroke.dash).dashed(&self.path);
                        rasterizer.stroke(&dashed, &stroke.style, Some(clip))
                    } else {
                        rasterizer.stroke(&self.path, &stroke.style, Some(clip))
                    }
                }
                Some(_) => VRle::new(),
                None => rasterizer.fill(&self.path, self.fill_rule, Some(clip)),
            };
            self.raster_clip = Some(clip);
        }
        self.dirty = DrawableDirty::empty();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/drawable.rs"]
mod tests;
