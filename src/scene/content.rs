//! Shape-layer content tree: groups, geometry, paints, trims and repeaters.
//!
//! Nodes live in per-kind arenas; the group tree refers to them by index.
//! Paints apply to the geometry that precedes them in document order, which
//! is found by walking each group's children back to front.

use crate::foundation::core::{Affine, Color, Point, Rect, Vec2, affine_fuzzy_eq, affine_scale};
use crate::geometry::{StrokeStyle, TrimSegment, VPath, trim_individually};
use crate::model::{
    Animatable, ContentItem, EllipseShape, Fill, GradientFill, GradientParams, GradientStroke, GradientType,
    PathShape, Polystar, PolystarKind, RectShape, Repeater, Stroke, StrokeParams, Transform, Trim,
    TrimMode,
};
use crate::paint::{Brush, Gradient, GradientKind, Spread};
use crate::raster::FillRule;
use crate::scene::DirtyFlag;
use crate::scene::drawable::{Drawable, StrokeInfo};
use crate::scene::keypath::{OverrideSet, PaintClass, PaintOverrides};

/// Evaluated content of one shape layer.
#[derive(Debug)]
pub(crate) struct ShapeContent {
    root: GroupNode,
    arena: Arena,
}

#[derive(Debug, Default)]
struct Arena {
    paths: Vec<PathNode>,
    paints: Vec<PaintNode>,
    trims: Vec<TrimNode>,
}

#[derive(Debug)]
enum Node {
    Group(GroupNode),
    Path(usize),
    Paint(usize),
    Trim(usize),
    Repeater(RepeaterNode),
}

#[derive(Debug)]
struct GroupNode {
    transform: Option<Transform>,
    children: Vec<Node>,
    matrix: Affine,
    alpha: f32,
}

impl GroupNode {
    fn new(transform: Option<Transform>, children: Vec<Node>) -> Self {
        Self {
            transform,
            children,
            matrix: Affine::IDENTITY,
            alpha: 1.0,
        }
    }
}

#[derive(Debug)]
struct RepeaterNode {
    model: Repeater,
    /// Copy `i` at index `i`.
    copies: Vec<GroupNode>,
}

#[derive(Debug)]
enum Geometry {
    Rect(RectShape),
    Ellipse(EllipseShape),
    Path(PathShape),
    Polystar(Polystar),
}

impl Geometry {
    fn is_static(&self) -> bool {
        match self {
            Self::Rect(r) => r.position.is_static() && r.size.is_static() && r.roundness.is_static(),
            Self::Ellipse(e) => e.position.is_static() && e.size.is_static(),
            Self::Path(p) => p.shape.is_static(),
            Self::Polystar(p) => {
                p.position.is_static()
                    && p.points.is_static()
                    && p.inner_radius.is_static()
                    && p.inner_roundness.is_static()
                    && p.outer_radius.is_static()
                    && p.outer_roundness.is_static()
                    && p.rotation.is_static()
            }
        }
    }

    fn build(&self, frame: f32, path: &mut VPath) {
        path.reset();
        match self {
            Self::Rect(r) => {
                let rect = centered_rect(r.position.value(frame), r.size.value(frame));
                let max_round = rect.width().min(rect.height()) / 2.0;
                let round = f64::from(r.roundness.value(frame)).clamp(0.0, max_round);
                path.add_round_rect(rect, round, round, r.direction);
            }
            Self::Ellipse(e) => {
                path.add_oval(centered_rect(e.position.value(frame), e.size.value(frame)), e.direction);
            }
            Self::Path(p) => p.shape.value(frame).to_path(path),
            Self::Polystar(s) => {
                let f = |v: &Animatable<f32>| f64::from(v.value(frame));
                let center = s.position.value(frame);
                match s.kind {
                    PolystarKind::Star => path.add_polystar(
                        f(&s.points),
                        f(&s.inner_radius),
                        f(&s.outer_radius),
                        f(&s.inner_roundness),
                        f(&s.outer_roundness),
                        f(&s.rotation),
                        center,
                        s.direction,
                    ),
                    PolystarKind::Polygon => path.add_polygon(
                        f(&s.points),
                        f(&s.outer_radius),
                        f(&s.outer_roundness),
                        f(&s.rotation),
                        center,
                        s.direction,
                    ),
                }
            }
        }
    }
}

fn centered_rect(center: Point, size: Vec2) -> Rect {
    let half = Vec2::new(size.x.abs() / 2.0, size.y.abs() / 2.0);
    Rect::from_points(center - half, center + half)
}

#[derive(Debug)]
struct Binding {
    paint: usize,
    /// Paint declared in the same group as the path.
    same_group: bool,
    drawable: Drawable,
}

#[derive(Debug)]
struct PathNode {
    geometry: Geometry,
    geometry_static: bool,
    local: VPath,
    /// Local path after trims.
    trimmed: VPath,
    /// Device path.
    device: VPath,
    matrix: Affine,
    alpha: f32,
    visible: bool,
    /// Trims that reach this path.
    trims: Vec<usize>,
    bindings: Vec<Binding>,
    init: bool,
    local_changed: bool,
    trim_changed: bool,
    matrix_changed: bool,
}

#[derive(Debug)]
enum PaintModel {
    Fill(Fill),
    Stroke(Stroke),
    GradientFill(GradientFill),
    GradientStroke(GradientStroke),
}

impl PaintModel {
    fn class(&self) -> PaintClass {
        match self {
            Self::Fill(_) | Self::GradientFill(_) => PaintClass::Fill,
            Self::Stroke(_) | Self::GradientStroke(_) => PaintClass::Stroke,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum PaintSource {
    Color(Color),
    /// Gradient in the paint's space, alpha not yet applied.
    Gradient(Gradient),
}

/// A paint evaluated at one frame.
#[derive(Clone, Debug, PartialEq)]
struct PaintState {
    source: PaintSource,
    /// `[0, 1]`.
    opacity: f32,
    fill_rule: FillRule,
    stroke: Option<StrokeInfo>,
}

#[derive(Debug)]
struct PaintNode {
    model: PaintModel,
    /// Layer and group names down to this paint.
    chain: Vec<String>,
    overrides: PaintOverrides,
    alpha: f32,
    state: Option<PaintState>,
}

impl PaintNode {
    fn update(&mut self, frame: f32, matrix: Affine, alpha: f32) {
        self.alpha = alpha;
        let ov = &self.overrides;
        let opacity = |value: f32| (ov.opacity.unwrap_or(value) / 100.0).clamp(0.0, 1.0);
        let scale = affine_scale(&matrix);
        let state = match &self.model {
            PaintModel::Fill(f) => PaintState {
                source: PaintSource::Color(ov.color.unwrap_or_else(|| f.color.value(frame))),
                opacity: opacity(f.opacity.value(frame)),
                fill_rule: f.fill_rule,
                stroke: None,
            },
            PaintModel::Stroke(s) => PaintState {
                source: PaintSource::Color(ov.color.unwrap_or_else(|| s.color.value(frame))),
                opacity: opacity(s.opacity.value(frame)),
                fill_rule: FillRule::NonZero,
                stroke: Some(stroke_info(&s.params, frame, scale, ov.width)),
            },
            PaintModel::GradientFill(g) => PaintState {
                source: PaintSource::Gradient(gradient(&g.gradient, frame, matrix)),
                opacity: opacity(g.gradient.opacity.value(frame)),
                fill_rule: g.fill_rule,
                stroke: None,
            },
            PaintModel::GradientStroke(g) => PaintState {
                source: PaintSource::Gradient(gradient(&g.gradient, frame, matrix)),
                opacity: opacity(g.gradient.opacity.value(frame)),
                fill_rule: FillRule::NonZero,
                stroke: Some(stroke_info(&g.params, frame, scale, ov.width)),
            },
        };
        self.state = Some(state);
    }

    /// Brush for a path with combined alpha `path_alpha`.
    fn brush(&self, state: &PaintState, path_alpha: f32, same_group: bool) -> Brush {
        let factor = if same_group {
            path_alpha
        } else {
            self.alpha * path_alpha
        };
        let alpha = state.opacity * factor;
        match &state.source {
            PaintSource::Color(c) => Brush::Solid(c.with_alpha(alpha)),
            PaintSource::Gradient(g) => Brush::Gradient(Gradient {
                alpha: g.alpha * alpha,
                ..g.clone()
            }),
        }
    }
}

fn stroke_info(params: &StrokeParams, frame: f32, scale: f64, width: Option<f32>) -> StrokeInfo {
    let width = f64::from(width.unwrap_or_else(|| params.width.value(frame)));
    let dash = if params.dash.is_empty() {
        Vec::new()
    } else {
        params.dash.value(frame).into_iter().map(|d| d * scale).collect()
    };
    StrokeInfo {
        style: StrokeStyle {
            width: width * scale,
            cap: params.cap,
            join: params.join,
            miter_limit: f64::from(params.miter_limit),
        },
        dash,
    }
}

fn gradient(params: &GradientParams, frame: f32, matrix: Affine) -> Gradient {
    let start = params.start.value(frame);
    let end = params.end.value(frame);
    let kind = match params.kind {
        GradientType::Linear => GradientKind::Linear { start, end },
        GradientType::Radial => {
            let radius = (end - start).hypot();
            let mut progress = f64::from(params.highlight_length.value(frame)) / 100.0;
            progress = progress.clamp(-0.99, 0.99);
            let angle = (end - start).atan2() + f64::from(params.highlight_angle.value(frame)).to_radians();
            let focal = start + Vec2::from_angle(angle) * (progress * radius);
            GradientKind::Radial {
                center: start,
                radius,
                focal,
            }
        }
    };
    Gradient {
        kind,
        stops: params.stops.value(frame).to_stops(params.color_count),
        spread: Spread::Pad,
        alpha: 1.0,
        transform: matrix,
    }
}

#[derive(Debug)]
struct TrimNode {
    model: Trim,
    segment: TrimSegment,
    /// Paths this trim applies to, in document order.
    targets: Vec<usize>,
    init: bool,
    changed: bool,
}

impl TrimNode {
    fn update(&mut self, frame: f32) {
        let segment = TrimSegment::from_percent(
            f64::from(self.model.start.value(frame)),
            f64::from(self.model.end.value(frame)),
            f64::from(self.model.offset.value(frame)),
        );
        self.changed = !self.init || segment != self.segment;
        self.segment = segment;
        self.init = true;
    }
}

struct Builder<'a> {
    arena: &'a mut Arena,
    chain: Vec<String>,
}

impl Builder<'_> {
    fn items(&mut self, items: &[ContentItem]) -> Vec<Node> {
        let visible: Vec<&ContentItem> = items.iter().filter(|i| !i.info().hidden).collect();
        self.visible_items(&visible)
    }

    fn visible_items(&mut self, items: &[&ContentItem]) -> Vec<Node> {
        let mut nodes = Vec::new();
        // The last repeater wraps everything before it; earlier ones nest inside.
        let last_repeater = items.iter().enumerate().rev().find_map(|(at, item)| match item {
            ContentItem::Repeater(model) => Some((at, model)),
            _ => None,
        });
        let rest = match last_repeater {
            Some((at, model)) => {
                let copies = (0..model.max_copies())
                    .map(|_| GroupNode::new(None, self.visible_items(&items[..at])))
                    .collect();
                nodes.push(Node::Repeater(RepeaterNode {
                    model: model.clone(),
                    copies,
                }));
                &items[at + 1..]
            }
            None => items,
        };
        for item in rest {
            if let Some(node) = self.item(item) {
                nodes.push(node);
            }
        }
        nodes
    }

    fn item(&mut self, item: &ContentItem) -> Option<Node> {
        let geometry = |g: Geometry| {
            let geometry_static = g.is_static();
            PathNode {
                geometry: g,
                geometry_static,
                local: VPath::new(),
                trimmed: VPath::new(),
                device: VPath::new(),
                matrix: Affine::IDENTITY,
                alpha: 1.0,
                visible: true,
                trims: Vec::new(),
                bindings: Vec::new(),
                init: false,
                local_changed: false,
                trim_changed: false,
                matrix_changed: false,
            }
        };
        let node = match item {
            ContentItem::Group(g) => {
                self.chain.push(g.info.name.clone().unwrap_or_default());
                let children = self.items(&g.items);
                self.chain.pop();
                Node::Group(GroupNode::new(g.transform.clone(), children))
            }
            ContentItem::Rect(r) => self.path(geometry(Geometry::Rect(r.clone()))),
            ContentItem::Ellipse(e) => self.path(geometry(Geometry::Ellipse(e.clone()))),
            ContentItem::Path(p) => self.path(geometry(Geometry::Path(p.clone()))),
            ContentItem::Polystar(p) => self.path(geometry(Geometry::Polystar(p.clone()))),
            ContentItem::Fill(f) => self.paint(&f.info.name, PaintModel::Fill(f.clone())),
            ContentItem::Stroke(s) => self.paint(&s.info.name, PaintModel::Stroke(s.clone())),
            ContentItem::GradientFill(g) => self.paint(&g.info.name, PaintModel::GradientFill(g.clone())),
            ContentItem::GradientStroke(g) => {
                self.paint(&g.info.name, PaintModel::GradientStroke(g.clone()))
            }
            ContentItem::Trim(t) => {
                self.arena.trims.push(TrimNode {
                    model: t.clone(),
                    segment: TrimSegment::FULL,
                    targets: Vec::new(),
                    init: false,
                    changed: false,
                });
                Node::Trim(self.arena.trims.len() - 1)
            }
            // Consumed by `visible_items`.
            ContentItem::Repeater(_) => return None,
        };
        Some(node)
    }

    fn path(&mut self, node: PathNode) -> Node {
        self.arena.paths.push(node);
        Node::Path(self.arena.paths.len() - 1)
    }

    fn paint(&mut self, name: &Option<String>, model: PaintModel) -> Node {
        let mut chain = self.chain.clone();
        chain.push(name.clone().unwrap_or_default());
        self.arena.paints.push(PaintNode {
            model,
            chain,
            overrides: PaintOverrides::default(),
            alpha: 1.0,
            state: None,
        });
        Node::Paint(self.arena.paints.len() - 1)
    }
}

/// Attach paints and trims to the paths they apply to.
fn bind(children: &[Node], paints: &mut Vec<usize>, trims: &mut Vec<usize>, arena: &mut Arena) {
    let outer_paints = paints.len();
    let outer_trims = trims.len();
    for node in children.iter().rev() {
        match node {
            Node::Paint(id) => paints.push(*id),
            Node::Trim(id) => trims.push(*id),
            Node::Path(id) => {
                let path = &mut arena.paths[*id];
                path.bindings = paints
                    .iter()
                    .enumerate()
                    .map(|(i, &paint)| Binding {
                        paint,
                        same_group: i >= outer_paints,
                        drawable: Drawable::default(),
                    })
                    .collect();
                path.trims = trims.iter().rev().copied().collect();
                for &t in trims.iter() {
                    arena.trims[t].targets.push(*id);
                }
            }
            Node::Group(g) => bind(&g.children, paints, trims, arena),
            Node::Repeater(r) => {
                for copy in &r.copies {
                    bind(&copy.children, paints, trims, arena);
                }
            }
        }
    }
    paints.truncate(outer_paints);
    trims.truncate(outer_trims);
}

fn update_nodes(
    children: &mut [Node],
    frame: f32,
    matrix: Affine,
    alpha: f32,
    flag: DirtyFlag,
    visible: bool,
    arena: &mut Arena,
) {
    for node in children.iter_mut().rev() {
        match node {
            Node::Group(g) => update_group(g, frame, matrix, alpha, flag, visible, arena),
            Node::Path(id) => {
                let path = &mut arena.paths[*id];
                path.local_changed = false;
                if !(path.init && path.geometry_static) {
                    path.geometry.build(frame, &mut path.local);
                    path.local_changed = true;
                }
                path.matrix_changed =
                    !path.init || flag.contains(DirtyFlag::MATRIX) || !affine_fuzzy_eq(&path.matrix, &matrix);
                path.init = true;
                path.matrix = matrix;
                path.alpha = alpha;
                path.visible = visible;
            }
            Node::Paint(id) => arena.paints[*id].update(frame, matrix, alpha),
            Node::Trim(id) => arena.trims[*id].update(frame),
            Node::Repeater(r) => update_repeater(r, frame, matrix, alpha, flag, visible, arena),
        }
    }
}

fn update_group(
    group: &mut GroupNode,
    frame: f32,
    parent_matrix: Affine,
    parent_alpha: f32,
    flag: DirtyFlag,
    visible: bool,
    arena: &mut Arena,
) {
    let (matrix, alpha) = match &group.transform {
        Some(t) => (parent_matrix * t.matrix(frame), parent_alpha * t.opacity(frame)),
        None => (parent_matrix, parent_alpha),
    };
    let mut flag = flag;
    if !affine_fuzzy_eq(&matrix, &group.matrix) {
        flag |= DirtyFlag::MATRIX;
    }
    if alpha != group.alpha {
        flag |= DirtyFlag::ALPHA;
    }
    group.matrix = matrix;
    group.alpha = alpha;
    update_nodes(&mut group.children, frame, matrix, alpha, flag, visible, arena);
}

fn update_repeater(
    node: &mut RepeaterNode,
    frame: f32,
    matrix: Affine,
    alpha: f32,
    flag: DirtyFlag,
    visible: bool,
    arena: &mut Arena,
) {
    let model = &node.model;
    let count = model.copies.value(frame).max(0.0);
    let offset = f64::from(model.offset.value(frame));
    let start_opacity = model.start_opacity.value(frame) / 100.0;
    let end_opacity = model.end_opacity.value(frame) / 100.0;
    let last = (count.ceil() - 1.0).max(1.0);
    for (i, copy) in node.copies.iter_mut().enumerate() {
        let t = (i as f32 / last).min(1.0);
        let copy_alpha = (start_opacity + (end_opacity - start_opacity) * t).clamp(0.0, 1.0);
        let copy_matrix = repeat_matrix(&model.transform, frame, i as f64 + offset);
        let shown = visible && (i as f32) < count;
        update_group(copy, frame, matrix * copy_matrix, alpha * copy_alpha, flag, shown, arena);
    }
}

/// The repeater transform applied `n` times.
fn repeat_matrix(transform: &Transform, frame: f32, n: f64) -> Affine {
    let anchor = transform.anchor.value(frame).to_vec2();
    let position = transform.position.value(frame).to_vec2();
    let scale = transform.scale.value(frame);
    let rotation = f64::from(transform.rotation.value(frame)).to_radians();
    Affine::translate(position * n)
        * Affine::translate(anchor)
        * Affine::rotate(rotation * n)
        * Affine::scale_non_uniform((scale.x / 100.0).powf(n), (scale.y / 100.0).powf(n))
        * Affine::translate(-anchor)
}

impl ShapeContent {
    /// Build the content tree for a shape layer named by `layer_chain`.
    pub(crate) fn new(items: &[ContentItem], layer_chain: &[String]) -> Self {
        let mut arena = Arena::default();
        let children = Builder {
            arena: &mut arena,
            chain: layer_chain.to_vec(),
        }
        .items(items);
        let root = GroupNode::new(None, children);
        bind(&root.children, &mut Vec::new(), &mut Vec::new(), &mut arena);
        for trim in &mut arena.trims {
            trim.targets.reverse();
        }
        Self { root, arena }
    }

    /// Re-resolve keypath overrides for every paint.
    pub(crate) fn apply_overrides(&mut self, overrides: &OverrideSet) {
        for paint in &mut self.arena.paints {
            paint.overrides = overrides.resolve(paint.chain.as_slice(), paint.model.class());
        }
    }

    /// Evaluate at `frame` under the layer's combined matrix and alpha.
    pub(crate) fn update(&mut self, frame: f32, matrix: Affine, alpha: f32, flag: DirtyFlag) {
        update_group(&mut self.root, frame, matrix, alpha, flag, true, &mut self.arena);
        self.apply_trims();
        self.update_drawables();
    }

    fn apply_trims(&mut self) {
        let Arena { paths, trims, .. } = &mut self.arena;
        for path in paths.iter_mut() {
            path.trim_changed = false;
        }
        let rerun = trims.iter().any(|t| t.changed)
            || paths.iter().any(|p| !p.trims.is_empty() && p.local_changed);
        if rerun {
            for path in paths.iter_mut().filter(|p| !p.trims.is_empty()) {
                path.trimmed = path.local.clone();
                path.trim_changed = true;
            }
            // Reverse document order: a later-declared trim applies before earlier ones.
            for trim in trims.iter().rev() {
                if trim.segment.is_full() {
                    continue;
                }
                match trim.model.mode {
                    TrimMode::Simultaneously => {
                        for &id in &trim.targets {
                            paths[id].trimmed = trim.segment.trim(&paths[id].trimmed);
                        }
                    }
                    TrimMode::Individually => {
                        let input: Vec<VPath> = trim.targets.iter().map(|&id| paths[id].trimmed.clone()).collect();
                        for (&id, out) in trim.targets.iter().zip(trim_individually(&input, trim.segment)) {
                            paths[id].trimmed = out;
                        }
                    }
                }
            }
        }
        for path in paths.iter_mut().filter(|p| p.trims.is_empty() && p.local_changed) {
            path.trimmed = path.local.clone();
        }
    }

    fn update_drawables(&mut self) {
        let Arena { paths, paints, .. } = &mut self.arena;
        for path in paths.iter_mut() {
            let geometry_changed = path.local_changed || path.trim_changed || path.matrix_changed;
            if geometry_changed {
                path.device = path.trimmed.transformed(&path.matrix);
            }
            if !path.visible {
                continue;
            }
            for binding in &mut path.bindings {
                let paint = &paints[binding.paint];
                let Some(state) = &paint.state else {
                    continue;
                };
                if !binding.drawable.path.shares_buffer_with(&path.device) {
                    binding.drawable.set_path(path.device.clone());
                }
                binding.drawable.set_brush(paint.brush(state, path.alpha, binding.same_group));
                binding.drawable.set_fill_rule(state.fill_rule);
                binding.drawable.set_stroke(state.stroke.clone());
            }
        }
    }

    /// Visible drawables in no particular order.
    pub(crate) fn drawables_mut(&mut self) -> impl Iterator<Item = &mut Drawable> + '_ {
        self.arena
            .paths
            .iter_mut()
            .filter(|p| p.visible)
            .flat_map(|p| p.bindings.iter_mut().map(|b| &mut b.drawable))
    }

    /// Visible drawables back to front.
    pub(crate) fn render_list<'a>(&'a self, out: &mut Vec<&'a Drawable>) {
        collect(&self.root.children, &self.arena, out);
    }
}

fn collect<'a>(children: &'a [Node], arena: &'a Arena, out: &mut Vec<&'a Drawable>) {
    for node in children.iter().rev() {
        match node {
            Node::Group(g) => collect(&g.children, arena, out),
            Node::Path(id) => {
                let path = &arena.paths[*id];
                if path.visible {
                    out.extend(path.bindings.iter().map(|b| &b.drawable));
                }
            }
            Node::Repeater(r) => {
                for copy in &r.copies {
                    collect(&copy.children, arena, out);
                }
            }
            Node::Paint(_) | Node::Trim(_) => {}
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/content.rs"]
mod tests;
