//! Layer instances: one `LayerItem` per model layer, stored in an arena.

use std::sync::Arc;

use crate::foundation::core::{Affine, IRect, Rect, affine_fuzzy_eq};
use crate::geometry::{Direction, VPath};
use crate::model::{Composition, Layer, LayerKind, MatteType};
use crate::paint::{Bitmap, Brush, CompositionMode, Painter, Surface, Texture, composite, luma_to_alpha};
use crate::raster::{FillRule, VRle, fill_path};
use crate::scene::DirtyFlag;
use crate::scene::content::ShapeContent;
use crate::scene::drawable::Drawable;
use crate::scene::keypath::OverrideSet;
use crate::scene::mask::{self, MaskItem};

/// Index into the layer arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct LayerId(pub(crate) usize);

/// Where a layer's model lives.
#[derive(Clone, Debug)]
pub(crate) enum LayerSource {
    Root(Arc<Composition>, usize),
    Precomp(Arc<Vec<Layer>>, usize),
}

impl LayerSource {
    pub(crate) fn layer(&self) -> &Layer {
        match self {
            Self::Root(comp, i) => &comp.layers[*i],
            Self::Precomp(layers, i) => &layers[*i],
        }
    }
}

#[derive(Debug)]
pub(crate) enum LayerContent {
    Shape(ShapeContent),
    Solid(Drawable),
    Image {
        bitmap: Option<Arc<Bitmap>>,
        drawable: Drawable,
    },
    Precomp {
        /// Paint order, back to front.
        children: Vec<LayerId>,
        /// Precomp viewport in device space.
        clip: Option<VRle>,
    },
    Null,
}

#[derive(Debug)]
pub(crate) struct LayerItem {
    pub(crate) source: LayerSource,
    parent: Option<LayerId>,
    /// Layer above this one in document order, when a matte is set.
    pub(crate) matte_source: Option<LayerId>,
    pub(crate) content: LayerContent,
    pub(crate) masks: Vec<MaskItem>,
    is_static: bool,
    pub(crate) visible: bool,
    pub(crate) matrix: Affine,
    pub(crate) alpha: f32,
    pub(crate) flag: DirtyFlag,
    initialized: bool,
    /// Number of content updates, for change tracking.
    pub(crate) update_count: u64,
}

impl LayerItem {
    fn children(&self) -> Vec<LayerId> {
        match &self.content {
            LayerContent::Precomp { children, .. } => children.clone(),
            _ => Vec::new(),
        }
    }
}

/// All layer instances of one animation.
#[derive(Debug)]
pub(crate) struct LayerTree {
    pub(crate) items: Vec<LayerItem>,
    /// Top-level layers, back to front.
    pub(crate) roots: Vec<LayerId>,
    frame_rate: f32,
}

impl LayerTree {
    pub(crate) fn new(comp: &Arc<Composition>) -> Self {
        let mut tree = Self {
            items: Vec::new(),
            roots: Vec::new(),
            frame_rate: comp.frame_rate,
        };
        let sources = (0..comp.layers.len())
            .map(|i| LayerSource::Root(comp.clone(), i))
            .collect();
        tree.roots = tree.build_scope(sources, &mut Vec::new());
        tree
    }

    fn build_scope(&mut self, sources: Vec<LayerSource>, chain: &mut Vec<String>) -> Vec<LayerId> {
        let mut ids: Vec<LayerId> = sources.into_iter().map(|s| self.build_layer(s, chain)).collect();

        for (pos, &id) in ids.iter().enumerate() {
            let layer = self.items[id.0].source.layer();
            let parent = layer.parent.and_then(|p| {
                ids.iter()
                    .copied()
                    .find(|&other| other != id && self.items[other.0].source.layer().index == Some(p))
            });
            let matte_source = (layer.matte != MatteType::None && pos > 0).then(|| ids[pos - 1]);
            let item = &mut self.items[id.0];
            item.parent = parent;
            item.matte_source = matte_source;
        }
        for &id in &ids {
            let is_static = self.items[id.0].source.layer().is_static() && self.parents_static(id);
            self.items[id.0].is_static = is_static;
        }

        // Document order is front to back.
        ids.reverse();
        ids
    }

    fn build_layer(&mut self, source: LayerSource, chain: &mut Vec<String>) -> LayerId {
        let layer = source.layer();
        chain.push(layer.name.clone().unwrap_or_default());
        let content = match &layer.kind {
            LayerKind::Shape { items } => LayerContent::Shape(ShapeContent::new(items, chain)),
            LayerKind::Solid { .. } => LayerContent::Solid(Drawable::default()),
            LayerKind::Image { asset } => LayerContent::Image {
                bitmap: asset.as_ref().and_then(|a| a.bitmap.clone()),
                drawable: Drawable::default(),
            },
            LayerKind::Precomp { layers, .. } => {
                let sources = (0..layers.len())
                    .map(|i| LayerSource::Precomp(layers.clone(), i))
                    .collect();
                LayerContent::Precomp {
                    children: self.build_scope(sources, chain),
                    clip: None,
                }
            }
            LayerKind::Null | LayerKind::Text => LayerContent::Null,
        };
        chain.pop();
        let masks = layer.masks.iter().cloned().map(MaskItem::new).collect();
        self.items.push(LayerItem {
            source,
            parent: None,
            matte_source: None,
            content,
            masks,
            is_static: false,
            visible: false,
            matrix: Affine::IDENTITY,
            alpha: 1.0,
            flag: DirtyFlag::empty(),
            initialized: false,
            update_count: 0,
        });
        LayerId(self.items.len() - 1)
    }

    /// Walk the parent chain; a cycle stops after visiting every layer once.
    fn parents(&self, id: LayerId) -> impl Iterator<Item = LayerId> + '_ {
        std::iter::successors(self.items[id.0].parent, |p| self.items[p.0].parent).take(self.items.len())
    }

    fn parents_static(&self, id: LayerId) -> bool {
        self.parents(id)
            .all(|p| self.items[p.0].source.layer().transform.is_static())
    }

    fn local_matrix(&self, id: LayerId, frame: f32) -> Affine {
        self.parents(id).fold(self.items[id.0].source.layer().transform.matrix(frame), |m, p| {
            self.items[p.0].source.layer().transform.matrix(frame) * m
        })
    }

    /// Push new keypath overrides into every shape layer.
    pub(crate) fn apply_overrides(&mut self, overrides: &OverrideSet) {
        for item in &mut self.items {
            if let LayerContent::Shape(content) = &mut item.content {
                content.apply_overrides(overrides);
                item.initialized = false;
            }
        }
    }

    pub(crate) fn update(&mut self, frame: f32, matrix: Affine, flag: DirtyFlag, clip: IRect) {
        for id in self.roots.clone() {
            self.update_layer(id, frame, matrix, 1.0, flag, clip);
        }
    }

    fn update_layer(
        &mut self,
        id: LayerId,
        frame: f32,
        parent_matrix: Affine,
        parent_alpha: f32,
        flag: DirtyFlag,
        clip: IRect,
    ) {
        let source = self.items[id.0].source.clone();
        let layer = source.layer();
        if !layer.is_visible_at(frame) {
            self.hide(id);
            return;
        }
        let matrix = parent_matrix * self.local_matrix(id, frame);
        let alpha = parent_alpha * layer.transform.opacity(frame);

        let item = &mut self.items[id.0];
        item.visible = true;
        let mut flag = flag;
        if !item.initialized || !affine_fuzzy_eq(&matrix, &item.matrix) {
            flag |= DirtyFlag::MATRIX;
        }
        if !item.initialized || alpha != item.alpha {
            flag |= DirtyFlag::ALPHA;
        }
        item.matrix = matrix;
        item.alpha = alpha;
        item.flag = flag;

        if !(item.initialized && flag.is_empty() && item.is_static) {
            item.update_count += 1;
            let matrix_dirty = flag.contains(DirtyFlag::MATRIX);
            for m in &mut item.masks {
                m.update(frame, &matrix, clip, matrix_dirty);
            }
            match (&mut item.content, &layer.kind) {
                (LayerContent::Shape(content), _) => content.update(frame, matrix, alpha, flag),
                (LayerContent::Solid(drawable), LayerKind::Solid { width, height, color }) => {
                    if matrix_dirty || drawable.path.is_empty() {
                        drawable.set_path(rect_path(f64::from(*width), f64::from(*height), &matrix));
                    }
                    drawable.set_brush(Brush::Solid(color.with_alpha(alpha)));
                }
                (LayerContent::Image { bitmap: Some(bitmap), drawable }, _) => {
                    if matrix_dirty || drawable.path.is_empty() {
                        let (w, h) = (f64::from(bitmap.width()), f64::from(bitmap.height()));
                        drawable.set_path(rect_path(w, h, &matrix));
                    }
                    drawable.set_brush(Brush::Texture(Texture {
                        image: bitmap.clone(),
                        transform: matrix,
                        alpha: (alpha * 255.0).round() as u8,
                    }));
                }
                (LayerContent::Precomp { clip: precomp_clip, .. }, LayerKind::Precomp { width, height, .. }) => {
                    if matrix_dirty && *width > 0.0 && *height > 0.0 {
                        let path = rect_path(f64::from(*width), f64::from(*height), &matrix);
                        *precomp_clip = Some(fill_path(&path, FillRule::NonZero, Some(clip)));
                    }
                }
                _ => {}
            }
            item.initialized = true;
        }

        let children = item.children();
        if !children.is_empty() {
            let child_frame = layer.child_frame(frame, self.frame_rate);
            for child in children {
                self.update_layer(child, child_frame, matrix, alpha, flag, clip);
            }
        }
    }

    fn hide(&mut self, id: LayerId) {
        let item = &mut self.items[id.0];
        item.visible = false;
        for child in item.children() {
            self.hide(child);
        }
    }

    /// Drawables of every layer that can be painted this frame.
    pub(crate) fn drawables_mut(&mut self) -> Vec<&mut Drawable> {
        let mut out = Vec::new();
        for item in &mut self.items {
            if !item.visible || item.source.layer().hidden {
                continue;
            }
            match &mut item.content {
                LayerContent::Shape(content) => out.extend(content.drawables_mut()),
                LayerContent::Solid(drawable) | LayerContent::Image { drawable, .. } => out.push(drawable),
                LayerContent::Precomp { .. } | LayerContent::Null => {}
            }
        }
        out
    }

    /// Paint `ids` back to front, clipped to `mask` when set.
    pub(crate) fn paint_list(&self, ids: &[LayerId], surface: &mut Surface, mask: Option<&VRle>, clip: IRect) {
        for &id in ids {
            let item = &self.items[id.0];
            let layer = item.source.layer();
            if !item.visible || layer.hidden || layer.is_matte_source {
                continue;
            }
            match item.matte_source {
                Some(source) if layer.matte != MatteType::None => {
                    self.paint_matted(id, source, layer.matte, surface, mask, clip);
                }
                _ => self.paint_layer(id, surface, mask, clip),
            }
        }
    }

    fn paint_matted(
        &self,
        id: LayerId,
        source: LayerId,
        matte: MatteType,
        surface: &mut Surface,
        mask: Option<&VRle>,
        clip: IRect,
    ) {
        let offscreen = || Surface::with_size(surface.width(), surface.height()).with_draw_region(surface.draw_region());
        let mut content = offscreen();
        self.paint_layer(id, &mut content, mask, clip);
        let mut matte_surface = offscreen();
        if self.items[source.0].visible {
            self.paint_layer(source, &mut matte_surface, mask, clip);
        }
        if matches!(matte, MatteType::Luma | MatteType::LumaInverted) {
            luma_to_alpha(&mut matte_surface);
        }
        let mode = match matte {
            MatteType::Alpha | MatteType::Luma => CompositionMode::DestIn,
            _ => CompositionMode::DestOut,
        };
        composite(&mut content, &matte_surface, mode, 255);
        composite(surface, &content, CompositionMode::SrcOver, 255);
    }

    fn paint_layer(&self, id: LayerId, surface: &mut Surface, inherited: Option<&VRle>, clip: IRect) {
        let item = &self.items[id.0];
        let mask = intersect(mask::combine(&item.masks, clip), inherited);
        match &item.content {
            LayerContent::Shape(content) => {
                let mut list = Vec::new();
                content.render_list(&mut list);
                draw(surface, &list, mask.as_ref());
            }
            LayerContent::Solid(drawable) | LayerContent::Image { drawable, .. } => {
                draw(surface, &[drawable], mask.as_ref());
            }
            LayerContent::Precomp { children, clip: precomp_clip } => {
                let mask = intersect(mask, precomp_clip.as_ref());
                self.paint_list(children, surface, mask.as_ref(), clip);
            }
            LayerContent::Null => {}
        }
    }
}

fn intersect(own: Option<VRle>, other: Option<&VRle>) -> Option<VRle> {
    match (own, other) {
        (Some(a), Some(b)) => Some(a.intersect(b)),
        (Some(a), None) => Some(a),
        (None, b) => b.cloned(),
    }
}

fn draw(surface: &mut Surface, list: &[&Drawable], mask: Option<&VRle>) {
    let mut painter = Painter::new(surface);
    for d in list {
        match mask {
            Some(m) => painter.draw_rle_clipped(&d.rle, m, &d.brush),
            None => painter.draw_rle(&d.rle, &d.brush),
        }
    }
}

fn rect_path(width: f64, height: f64, matrix: &Affine) -> VPath {
    let mut path = VPath::new();
    path.add_rect(Rect::new(0.0, 0.0, width, height), Direction::Cw);
    path.transform(matrix);
    path
}

#[cfg(test)]
#[path = "../../tests/unit/scene/layer.rs"]
mod tests;
