use std::sync::Arc;

use rayon::prelude::*;

use crate::foundation::core::{Affine, IRect};
use crate::foundation::error::LottieResult;
use crate::model::Composition;
use crate::paint::Surface;
use crate::scene::DirtyFlag;
use crate::scene::keypath::{KeyPath, OverrideSet, PropertyKind, PropertyValue};
use crate::scene::layer::LayerTree;
use crate::scene::render_tree::{RenderTree, layer_nodes};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Request {
    frame: f32,
    width: u32,
    height: u32,
    keep_aspect_ratio: bool,
}

/// Mutable per-animation evaluation state over a shared composition.
#[derive(Debug)]
pub(crate) struct Scene {
    comp: Arc<Composition>,
    pub(crate) tree: LayerTree,
    overrides: OverrideSet,
    last: Option<Request>,
    viewport: Affine,
    clip: IRect,
    parallel_raster: bool,
}

impl Scene {
    pub(crate) fn new(comp: Arc<Composition>, parallel_raster: bool) -> Self {
        let tree = LayerTree::new(&comp);
        Self {
            comp,
            tree,
            overrides: OverrideSet::default(),
            last: None,
            viewport: Affine::IDENTITY,
            clip: IRect::new(0, 0, 0, 0),
            parallel_raster,
        }
    }

    /// Composition-to-device matrix for a `width` x `height` target.
    pub(crate) fn viewport(comp: &Composition, width: u32, height: u32, keep_aspect_ratio: bool) -> Affine {
        let sx = f64::from(width) / f64::from(comp.width);
        let sy = f64::from(height) / f64::from(comp.height);
        if keep_aspect_ratio {
            let s = sx.min(sy);
            let tx = (f64::from(width) - f64::from(comp.width) * s) / 2.0;
            let ty = (f64::from(height) - f64::from(comp.height) * s) / 2.0;
            Affine::translate((tx, ty)) * Affine::scale(s)
        } else {
            Affine::scale_non_uniform(sx, sy)
        }
    }

    /// Evaluate the scene; returns `false` when the request repeats the last one.
    pub(crate) fn update(&mut self, frame: f32, width: u32, height: u32, keep_aspect_ratio: bool) -> bool {
        let request = Request {
            frame,
            width,
            height,
            keep_aspect_ratio,
        };
        if self.last == Some(request) {
            return false;
        }
        let resized = self
            .last
            .is_none_or(|l| (l.width, l.height, l.keep_aspect_ratio) != (width, height, keep_aspect_ratio));
        let mut flag = DirtyFlag::empty();
        if resized {
            self.viewport = Self::viewport(&self.comp, width, height, keep_aspect_ratio);
            self.clip = IRect::new(0, 0, width as i32, height as i32);
            flag |= DirtyFlag::MATRIX;
        }
        let frame = frame.clamp(self.comp.start_frame, self.comp.end_frame.max(self.comp.start_frame));
        self.tree.update(frame, self.viewport, flag, self.clip);
        self.last = Some(request);
        true
    }

    /// Evaluate `frame` and paint it onto `surface`, which is cleared first.
    #[tracing::instrument(level = "debug", skip(self, surface), fields(w = surface.width(), h = surface.height()))]
    pub(crate) fn render(&mut self, frame: f32, surface: &mut Surface, keep_aspect_ratio: bool) {
        if surface.is_empty() {
            return;
        }
        self.update(frame, surface.width(), surface.height(), keep_aspect_ratio);
        let clip = self.clip;
        let mut drawables = self.tree.drawables_mut();
        if self.parallel_raster {
            drawables.par_iter_mut().for_each(|d| d.rasterize(clip));
        } else {
            for d in drawables {
                d.rasterize(clip);
            }
        }
        surface.clear();
        self.tree.paint_list(&self.tree.roots, surface, None, clip);
    }

    pub(crate) fn render_tree(&mut self, frame: f32, width: u32, height: u32) -> RenderTree {
        self.update(frame, width, height, true);
        RenderTree {
            frame,
            width,
            height,
            layers: layer_nodes(&self.tree, &self.tree.roots),
        }
    }

    pub(crate) fn set_property(&mut self, keypath: &str, value: PropertyValue) -> LottieResult<()> {
        self.overrides.set(KeyPath::parse(keypath)?, value);
        self.refresh_overrides();
        Ok(())
    }

    pub(crate) fn remove_property(&mut self, keypath: &str, kind: PropertyKind) -> LottieResult<bool> {
        let removed = self.overrides.remove(&KeyPath::parse(keypath)?, kind);
        if removed {
            self.refresh_overrides();
        }
        Ok(removed)
    }

    fn refresh_overrides(&mut self) {
        self.tree.apply_overrides(&self.overrides);
        // The next request must re-evaluate even if it repeats the last one.
        self.last = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/composition.rs"]
mod tests;
