use crate::foundation::core::{Affine, IRect};
use crate::geometry::VPath;
use crate::model::{Mask, MaskMode};
use crate::raster::{FillRule, VRle, fill_path};

/// Per-instance state of one layer mask.
#[derive(Clone, Debug)]
pub(crate) struct MaskItem {
    pub(crate) model: Mask,
    /// Outline in device space.
    pub(crate) path: VPath,
    pub(crate) rle: VRle,
    init: bool,
}

impl MaskItem {
    pub(crate) fn new(model: Mask) -> Self {
        Self {
            model,
            path: VPath::new(),
            rle: VRle::new(),
            init: false,
        }
    }

    /// Recompute outline and coverage when the mask or its matrix changed.
    pub(crate) fn update(&mut self, frame: f32, matrix: &Affine, clip: IRect, matrix_dirty: bool) {
        if self.init && !matrix_dirty && self.model.is_static() {
            return;
        }
        self.init = true;

        let mut path = VPath::new();
        self.model.shape.value(frame).to_path(&mut path);
        path.transform(matrix);

        let mut rle = fill_path(&path, FillRule::NonZero, Some(clip));
        let opacity = self.model.opacity(frame);
        if opacity < 1.0 {
            rle = rle.mul_alpha((opacity * 255.0).round() as u8);
        }
        if self.model.inverted {
            rle = VRle::from_rect(clip).subtract(&rle);
        }
        self.path = path;
        self.rle = rle;
    }
}

/// Combine a layer's masks in document order.
///
/// Returns `None` when no mask takes part, meaning the layer is unmasked.
pub(crate) fn combine(masks: &[MaskItem], clip: IRect) -> Option<VRle> {
    let mut acc: Option<VRle> = None;
    for mask in masks {
        let rle = &mask.rle;
        acc = match mask.model.mode {
            MaskMode::Add => Some(match acc {
                Some(a) => a.union(rle),
                None => rle.clone(),
            }),
            MaskMode::Subtract => Some(acc.unwrap_or_else(|| VRle::from_rect(clip)).subtract(rle)),
            MaskMode::Intersect => Some(acc.unwrap_or_else(|| VRle::from_rect(clip)).intersect(rle)),
            MaskMode::Difference => Some(match acc {
                Some(a) => a.xor(rle),
                None => rle.clone(),
            }),
            MaskMode::None => acc,
        };
    }
    acc
}

#[cfg(test)]
#[path = "../../tests/unit/scene/mask.rs"]
mod tests;
