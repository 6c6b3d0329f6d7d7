use crate::foundation::core::{Color, Point, Vec2};
use crate::geometry::{CapStyle, Direction, JoinStyle, VPath};
use crate::model::animatable::Animatable;
use crate::model::transform::Transform;
use crate::paint::GradientStop;
use crate::raster::FillRule;

/// Bezier outline in flat form: the first vertex, then one
/// `(out control, in control, vertex)` triple per segment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapeData {
    /// Vertices and control points.
    pub points: Vec<Point>,
    /// Whether the outline returns to its first vertex.
    pub closed: bool,
}

impl ShapeData {
    /// Build from per-vertex positions and their relative in/out tangents.
    pub fn from_vertices(vertices: &[Point], in_tangents: &[Vec2], out_tangents: &[Vec2], closed: bool) -> Self {
        let n = vertices.len();
        if n == 0 {
            return Self::default();
        }
        let tangent = |list: &[Vec2], i: usize| list.get(i).copied().unwrap_or(Vec2::ZERO);
        let mut points = Vec::with_capacity(3 * n + 1);
        points.push(vertices[0]);
        let segments = if closed { n } else { n - 1 };
        for i in 0..segments {
            let j = (i + 1) % n;
            points.push(vertices[i] + tangent(out_tangents, i));
            points.push(vertices[j] + tangent(in_tangents, j));
            points.push(vertices[j]);
        }
        Self { points, closed }
    }

    /// Append this outline to `path`.
    pub fn to_path(&self, path: &mut VPath) {
        let Some(first) = self.points.first() else {
            return;
        };
        path.move_to(*first);
        for c in self.points[1..].chunks_exact(3) {
            path.cubic_to(c[0], c[1], c[2]);
        }
        if self.closed {
            path.close();
        }
    }
}

/// Raw gradient stop data: `count` color stops of `(offset, r, g, b)` followed
/// by optional `(offset, alpha)` opacity stops.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GradientData(pub Vec<f32>);

impl GradientData {
    /// Resolve into color stops, folding opacity stops into each color stop's alpha.
    pub fn to_stops(&self, count: usize) -> Vec<GradientStop> {
        let data = &self.0;
        let color_len = (count * 4).min(data.len() - data.len() % 4);
        let opacity: Vec<(f32, f32)> = data[color_len..]
            .chunks_exact(2)
            .map(|c| (c[0], c[1]))
            .collect();
        data[..color_len]
            .chunks_exact(4)
            .map(|c| GradientStop {
                offset: c[0],
                color: Color {
                    r: c[1],
                    g: c[2],
                    b: c[3],
                    a: opacity_at(&opacity, c[0]),
                },
            })
            .collect()
    }
}

fn opacity_at(stops: &[(f32, f32)], offset: f32) -> f32 {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return 1.0;
    };
    if offset <= first.0 {
        return first.1;
    }
    if offset >= last.0 {
        return last.1;
    }
    for w in stops.windows(2) {
        let ((o0, a0), (o1, a1)) = (w[0], w[1]);
        if offset >= o0 && offset <= o1 {
            if o1 <= o0 {
                return a1;
            }
            return a0 + (a1 - a0) * (offset - o0) / (o1 - o0);
        }
    }
    last.1
}

/// Name and visibility shared by every content item.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemInfo {
    /// Author-given name, used by keypaths.
    pub name: Option<String>,
    /// Hidden items are ignored when building the scene.
    pub hidden: bool,
}

/// Rectangle centered at `position`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RectShape {
    /// Name and visibility.
    pub info: ItemInfo,
    /// Center.
    pub position: Animatable<Point>,
    /// Width and height.
    pub size: Animatable<Vec2>,
    /// Corner radius.
    pub roundness: Animatable<f32>,
    /// Winding.
    pub direction: Direction,
}

/// Ellipse inscribed in a rectangle centered at `position`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EllipseShape {
    /// Name and visibility.
    pub info: ItemInfo,
    /// Center.
    pub position: Animatable<Point>,
    /// Width and height.
    pub size: Animatable<Vec2>,
    /// Winding.
    pub direction: Direction,
}

/// Free-form bezier outline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathShape {
    /// Name and visibility.
    pub info: ItemInfo,
    /// Outline.
    pub shape: Animatable<ShapeData>,
    /// Winding.
    pub direction: Direction,
}

/// Star or polygon variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PolystarKind {
    /// Alternating inner and outer vertices.
    #[default]
    Star,
    /// Outer vertices only.
    Polygon,
}

/// Star or regular polygon.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polystar {
    /// Name and visibility.
    pub info: ItemInfo,
    /// Star or polygon.
    pub kind: PolystarKind,
    /// Center.
    pub position: Animatable<Point>,
    /// Number of points.
    pub points: Animatable<f32>,
    /// Inner radius, stars only.
    pub inner_radius: Animatable<f32>,
    /// Inner roundness in percent, stars only.
    pub inner_roundness: Animatable<f32>,
    /// Outer radius.
    pub outer_radius: Animatable<f32>,
    /// Outer roundness in percent.
    pub outer_roundness: Animatable<f32>,
    /// Rotation in degrees.
    pub rotation: Animatable<f32>,
    /// Winding.
    pub direction: Direction,
}

/// Solid fill.
#[derive(Clone, Debug, PartialEq)]
pub struct Fill {
    /// Name and visibility.
    pub info: ItemInfo,
    /// Straight color.
    pub color: Animatable<Color>,
    /// Opacity in percent.
    pub opacity: Animatable<f32>,
    /// Winding rule.
    pub fill_rule: FillRule,
}

/// Dash pattern: alternating dash and gap lengths plus a phase offset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dash {
    /// Dash and gap lengths in order.
    pub pattern: Vec<Animatable<f32>>,
    /// Phase.
    pub offset: Animatable<f32>,
}

impl Dash {
    /// Dasher input at `frame`: the pattern followed by the offset.
    pub fn value(&self, frame: f32) -> Vec<f64> {
        let mut out: Vec<f64> = self.pattern.iter().map(|v| f64::from(v.value(frame))).collect();
        if out.len() % 2 == 1 {
            // A trailing dash without a gap repeats as its own gap.
            out.push(out[out.len() - 1]);
        }
        out.push(f64::from(self.offset.value(frame)));
        out
    }

    /// Return `true` when no dash length is set.
    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    fn is_static(&self) -> bool {
        self.offset.is_static() && self.pattern.iter().all(Animatable::is_static)
    }
}

/// Stroke geometry shared by solid and gradient strokes.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeParams {
    /// Line width.
    pub width: Animatable<f32>,
    /// End caps.
    pub cap: CapStyle,
    /// Corner joins.
    pub join: JoinStyle,
    /// Miter limit.
    pub miter_limit: f32,
    /// Optional dashing.
    pub dash: Dash,
}

impl StrokeParams {
    fn is_static(&self) -> bool {
        self.width.is_static() && self.dash.is_static()
    }
}

/// Solid stroke.
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    /// Name and visibility.
    pub info: ItemInfo,
    /// Straight color.
    pub color: Animatable<Color>,
    /// Opacity in percent.
    pub opacity: Animatable<f32>,
    /// Geometry.
    pub params: StrokeParams,
}

/// Linear or radial.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GradientType {
    /// Along start to end.
    #[default]
    Linear,
    /// Around start, reaching end at offset 1.
    Radial,
}

/// Gradient paint parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GradientParams {
    /// Linear or radial.
    pub kind: GradientType,
    /// Start point (radial center).
    pub start: Animatable<Point>,
    /// End point (radial edge).
    pub end: Animatable<Point>,
    /// Radial focal distance in percent of the radius.
    pub highlight_length: Animatable<f32>,
    /// Radial focal angle in degrees.
    pub highlight_angle: Animatable<f32>,
    /// Number of color stops in `stops`.
    pub color_count: usize,
    /// Stop data.
    pub stops: Animatable<GradientData>,
    /// Opacity in percent.
    pub opacity: Animatable<f32>,
}

impl GradientParams {
    fn is_static(&self) -> bool {
        self.start.is_static()
            && self.end.is_static()
            && self.highlight_length.is_static()
            && self.highlight_angle.is_static()
            && self.stops.is_static()
            && self.opacity.is_static()
    }
}

/// Gradient fill.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientFill {
    /// Name and visibility.
    pub info: ItemInfo,
    /// Gradient.
    pub gradient: GradientParams,
    /// Winding rule.
    pub fill_rule: FillRule,
}

/// Gradient stroke.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientStroke {
    /// Name and visibility.
    pub info: ItemInfo,
    /// Gradient.
    pub gradient: GradientParams,
    /// Geometry.
    pub params: StrokeParams,
}

/// How a trim applies to several paths.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TrimMode {
    /// Every path is trimmed by the same fraction of its own length.
    #[default]
    Simultaneously,
    /// All paths are trimmed as one path laid end to end.
    Individually,
}

/// Trim-path operator; values are percentages, offset in degrees.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trim {
    /// Name and visibility.
    pub info: ItemInfo,
    /// Start in percent.
    pub start: Animatable<f32>,
    /// End in percent.
    pub end: Animatable<f32>,
    /// Offset in degrees, a full turn being the whole path.
    pub offset: Animatable<f32>,
    /// Simultaneous or individual.
    pub mode: TrimMode,
}

/// Repeater operator.
#[derive(Clone, Debug, PartialEq)]
pub struct Repeater {
    /// Name and visibility.
    pub info: ItemInfo,
    /// Number of copies.
    pub copies: Animatable<f32>,
    /// Copy index offset.
    pub offset: Animatable<f32>,
    /// Transform applied once per copy step.
    pub transform: Transform,
    /// Opacity of the first copy in percent.
    pub start_opacity: Animatable<f32>,
    /// Opacity of the last copy in percent.
    pub end_opacity: Animatable<f32>,
}

/// Upper bound on the copies a single repeater instantiates.
pub const MAX_REPEATER_COPIES: usize = 1000;

impl Repeater {
    /// Highest copy count reached on any keyframe, at most
    /// [`MAX_REPEATER_COPIES`].
    pub fn max_copies(&self) -> usize {
        let max = match &self.copies {
            Animatable::Constant(c) => *c,
            Animatable::Keyframed(keys) => keys
                .iter()
                .flat_map(|k| [k.start, k.end])
                .fold(0.0_f32, f32::max),
        };
        let copies = max.max(0.0).ceil() as usize;
        if copies > MAX_REPEATER_COPIES {
            tracing::warn!(copies, cap = MAX_REPEATER_COPIES, "repeater copy count capped");
            return MAX_REPEATER_COPIES;
        }
        copies
    }
}

/// Group of items with its own transform.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Group {
    /// Name and visibility.
    pub info: ItemInfo,
    /// Children in document order.
    pub items: Vec<ContentItem>,
    /// Group transform, identity when absent.
    pub transform: Option<Transform>,
}

/// One shape-layer content item.
#[derive(Clone, Debug, PartialEq)]
pub enum ContentItem {
    /// Nested group.
    Group(Group),
    /// Rectangle.
    Rect(RectShape),
    /// Ellipse.
    Ellipse(EllipseShape),
    /// Bezier outline.
    Path(PathShape),
    /// Star or polygon.
    Polystar(Polystar),
    /// Solid fill.
    Fill(Fill),
    /// Solid stroke.
    Stroke(Stroke),
    /// Gradient fill.
    GradientFill(GradientFill),
    /// Gradient stroke.
    GradientStroke(GradientStroke),
    /// Trim operator.
    Trim(Trim),
    /// Repeater operator.
    Repeater(Repeater),
}

impl ContentItem {
    /// Name and visibility.
    pub fn info(&self) -> &ItemInfo {
        match self {
            Self::Group(i) => &i.info,
            Self::Rect(i) => &i.info,
            Self::Ellipse(i) => &i.info,
            Self::Path(i) => &i.info,
            Self::Polystar(i) => &i.info,
            Self::Fill(i) => &i.info,
            Self::Stroke(i) => &i.info,
            Self::GradientFill(i) => &i.info,
            Self::GradientStroke(i) => &i.info,
            Self::Trim(i) => &i.info,
            Self::Repeater(i) => &i.info,
        }
    }

    /// Return `true` when nothing in the item is animated.
    pub fn is_static(&self) -> bool {
        match self {
            Self::Group(g) => {
                g.transform.as_ref().is_none_or(Transform::is_static)
                    && g.items.iter().all(ContentItem::is_static)
            }
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
            Self::Fill(f) => f.color.is_static() && f.opacity.is_static(),
            Self::Stroke(s) => s.color.is_static() && s.opacity.is_static() && s.params.is_static(),
            Self::GradientFill(g) => g.gradient.is_static(),
            Self::GradientStroke(g) => g.gradient.is_static() && g.params.is_static(),
            Self::Trim(t) => t.start.is_static() && t.end.is_static() && t.offset.is_static(),
            Self::Repeater(r) => {
                r.copies.is_static()
                    && r.offset.is_static()
                    && r.transform.is_static()
                    && r.start_opacity.is_static()
                    && r.end_opacity.is_static()
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/content.rs"]
mod tests;
