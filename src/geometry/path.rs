use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

use crate::foundation::core::{Affine, Point, Rect, fuzzy_eq, fuzzy_zero};
use crate::geometry::bezier::Bezier;

/// Control-point offset approximating a quarter circle with one cubic.
pub(crate) const KAPPA: f64 = 0.552_284_749_8;

const POLYSTAR_MAGIC: f64 = 0.478_29 / 0.28;
const POLYGON_MAGIC: f64 = 0.25;

/// Path command. Points are stored separately, in order: one for `MoveTo`
/// and `LineTo`, three for `CubicTo`, none for `Close`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PathElement {
    /// Start a new subpath.
    MoveTo,
    /// Straight line to the next point.
    LineTo,
    /// Cubic curve through two control points to an end point.
    CubicTo,
    /// Close the current subpath.
    Close,
}

/// Winding direction used by the shape constructors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    /// Clockwise in screen space (y down).
    #[default]
    Cw,
    /// Counter-clockwise in screen space.
    Ccw,
}

#[derive(Clone, Debug, PartialEq)]
struct PathData {
    elements: Vec<PathElement>,
    points: Vec<Point>,
    segments: usize,
    start: Point,
    new_segment: bool,
}

impl Default for PathData {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            points: Vec::new(),
            segments: 0,
            start: Point::ORIGIN,
            new_segment: true,
        }
    }
}

/// Copy-on-write vector path.
///
/// Cloning is cheap; the first mutation on a shared instance copies the buffers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VPath {
    d: Arc<PathData>,
}

/// One drawing segment produced by [`VPath::segments_iter`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Segment {
    /// Start of a subpath at a point.
    Move(Point),
    /// Straight segment.
    Line(Point, Point),
    /// Cubic segment.
    Cubic(Bezier),
    /// Subpath closed.
    Close,
}

impl VPath {
    /// Empty path.
    pub fn new() -> Self {
        Self::default()
    }

    fn data_mut(&mut self) -> &mut PathData {
        Arc::make_mut(&mut self.d)
    }

    /// Return `true` when the path has no commands.
    pub fn is_empty(&self) -> bool {
        self.d.elements.is_empty()
    }

    /// Remove every command, keeping the allocation when unshared.
    pub fn reset(&mut self) {
        if self.is_empty() {
            return;
        }
        let d = self.data_mut();
        d.elements.clear();
        d.points.clear();
        d.segments = 0;
        d.start = Point::ORIGIN;
        d.new_segment = true;
    }

    /// Commands in order.
    pub fn elements(&self) -> &[PathElement] {
        &self.d.elements
    }

    /// Points referenced by the commands, in order.
    pub fn points(&self) -> &[Point] {
        &self.d.points
    }

    /// Number of subpaths.
    pub fn segment_count(&self) -> usize {
        self.d.segments
    }

    /// Return `true` when both handles share one buffer.
    pub fn shares_buffer_with(&self, other: &VPath) -> bool {
        Arc::ptr_eq(&self.d, &other.d)
    }

    fn check_new_segment(&mut self) {
        if self.d.new_segment {
            self.move_to(Point::ORIGIN);
        }
    }

    /// Start a new subpath at `p`.
    pub fn move_to(&mut self, p: Point) {
        let d = self.data_mut();
        d.start = p;
        d.new_segment = false;
        d.elements.push(PathElement::MoveTo);
        d.points.push(p);
        d.segments += 1;
    }

    /// Line from the current point to `p`.
    pub fn line_to(&mut self, p: Point) {
        self.check_new_segment();
        let d = self.data_mut();
        d.elements.push(PathElement::LineTo);
        d.points.push(p);
    }

    /// Cubic curve from the current point.
    pub fn cubic_to(&mut self, c1: Point, c2: Point, end: Point) {
        self.check_new_segment();
        let d = self.data_mut();
        d.elements.push(PathElement::CubicTo);
        d.points.extend([c1, c2, end]);
    }

    /// Close the current subpath, adding a line back to its start when needed.
    pub fn close(&mut self) {
        if self.is_empty() {
            return;
        }
        let start = self.d.start;
        if let Some(last) = self.d.points.last().copied()
            && !(fuzzy_eq(last.x, start.x) && fuzzy_eq(last.y, start.y))
        {
            self.line_to(start);
        }
        let d = self.data_mut();
        d.elements.push(PathElement::Close);
        d.new_segment = true;
    }

    /// Append all commands of `other`.
    pub fn add_path(&mut self, other: &VPath) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = other.clone();
            return;
        }
        let d = self.data_mut();
        d.elements.extend_from_slice(&other.d.elements);
        d.points.extend_from_slice(&other.d.points);
        d.segments += other.d.segments;
        d.start = other.d.start;
        d.new_segment = other.d.new_segment;
    }

    /// Apply `m` to every point in place.
    pub fn transform(&mut self, m: &Affine) {
        if self.is_empty() || *m == Affine::IDENTITY {
            return;
        }
        let d = self.data_mut();
        for p in &mut d.points {
            *p = *m * *p;
        }
        d.start = *m * d.start;
    }

    /// Transformed copy.
    pub fn transformed(&self, m: &Affine) -> VPath {
        let mut out = self.clone();
        out.transform(m);
        out
    }

    /// Iterate commands paired with their geometry.
    pub fn segments_iter(&self) -> impl Iterator<Item = Segment> + '_ {
        let mut idx = 0usize;
        let mut cur = Point::ORIGIN;
        self.d.elements.iter().map(move |el| match el {
            PathElement::MoveTo => {
                cur = self.d.points[idx];
                idx += 1;
                Segment::Move(cur)
            }
            PathElement::LineTo => {
                let p = self.d.points[idx];
                idx += 1;
                let seg = Segment::Line(cur, p);
                cur = p;
                seg
            }
            PathElement::CubicTo => {
                let b = Bezier::new(
                    cur,
                    self.d.points[idx],
                    self.d.points[idx + 1],
                    self.d.points[idx + 2],
                );
                idx += 3;
                cur = b.p3;
                Segment::Cubic(b)
            }
            PathElement::Close => Segment::Close,
        })
    }

    /// Total arc length of every subpath.
    pub fn length(&self) -> f64 {
        self.segments_iter()
            .map(|s| match s {
                Segment::Line(a, b) => a.distance(b),
                Segment::Cubic(b) => b.length(),
                Segment::Move(_) | Segment::Close => 0.0,
            })
            .sum()
    }

    /// Bounds of all points, control points included.
    pub fn bounding_rect(&self) -> Rect {
        let mut it = self.d.points.iter();
        let Some(first) = it.next() else {
            return Rect::ZERO;
        };
        it.fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p))
    }

    /// Append an axis-aligned rectangle.
    pub fn add_rect(&mut self, rect: Rect, dir: Direction) {
        let (x, y, w, h) = (rect.x0, rect.y0, rect.width(), rect.height());
        if fuzzy_zero(w) || fuzzy_zero(h) {
            return;
        }
        self.move_to(Point::new(x + w, y));
        match dir {
            Direction::Cw => {
                self.line_to(Point::new(x + w, y + h));
                self.line_to(Point::new(x, y + h));
                self.line_to(Point::new(x, y));
            }
            Direction::Ccw => {
                self.line_to(Point::new(x, y));
                self.line_to(Point::new(x, y + h));
                self.line_to(Point::new(x + w, y + h));
            }
        }
        self.close();
    }

    /// Append a rectangle whose corners are elliptic arcs of radii `rx`, `ry`.
    pub fn add_round_rect(&mut self, rect: Rect, rx: f64, ry: f64, dir: Direction) {
        let (x, y, w, h) = (rect.x0, rect.y0, rect.width(), rect.height());
        if fuzzy_zero(w) || fuzzy_zero(h) {
            return;
        }
        if fuzzy_zero(rx) || fuzzy_zero(ry) {
            self.add_rect(rect, dir);
            return;
        }
        let rx = (rx * 2.0).min(w);
        let ry = (ry * 2.0).min(h);
        self.move_to(Point::new(x + w, y + ry / 2.0));
        match dir {
            Direction::Cw => {
                self.arc_to(Rect::new(x + w - rx, y + h - ry, x + w, y + h), 0.0, -90.0, false);
                self.arc_to(Rect::new(x, y + h - ry, x + rx, y + h), -90.0, -90.0, false);
                self.arc_to(Rect::new(x, y, x + rx, y + ry), -180.0, -90.0, false);
                self.arc_to(Rect::new(x + w - rx, y, x + w, y + ry), -270.0, -90.0, false);
            }
            Direction::Ccw => {
                self.arc_to(Rect::new(x + w - rx, y, x + w, y + ry), 0.0, 90.0, false);
                self.arc_to(Rect::new(x, y, x + rx, y + ry), 90.0, 90.0, false);
                self.arc_to(Rect::new(x, y + h - ry, x + rx, y + h), 180.0, 90.0, false);
                self.arc_to(Rect::new(x + w - rx, y + h - ry, x + w, y + h), 270.0, 90.0, false);
            }
        }
        self.close();
    }

    /// Append an ellipse inscribed in `rect`, starting at 12 o'clock.
    pub fn add_oval(&mut self, rect: Rect, dir: Direction) {
        let (x, y, w, h) = (rect.x0, rect.y0, rect.width(), rect.height());
        if fuzzy_zero(w) || fuzzy_zero(h) {
            return;
        }
        let w2 = w / 2.0;
        let h2 = h / 2.0;
        let w2k = w2 * KAPPA;
        let h2k = h2 * KAPPA;
        let p = Point::new;

        self.move_to(p(x + w2, y));
        match dir {
            Direction::Cw => {
                self.cubic_to(p(x + w2 + w2k, y), p(x + w, y + h2 - h2k), p(x + w, y + h2));
                self.cubic_to(p(x + w, y + h2 + h2k), p(x + w2 + w2k, y + h), p(x + w2, y + h));
                self.cubic_to(p(x + w2 - w2k, y + h), p(x, y + h2 + h2k), p(x, y + h2));
                self.cubic_to(p(x, y + h2 - h2k), p(x + w2 - w2k, y), p(x + w2, y));
            }
            Direction::Ccw => {
                self.cubic_to(p(x + w2 - w2k, y), p(x, y + h2 - h2k), p(x, y + h2));
                self.cubic_to(p(x, y + h2 + h2k), p(x + w2 - w2k, y + h), p(x + w2, y + h));
                self.cubic_to(p(x + w2 + w2k, y + h), p(x + w, y + h2 + h2k), p(x + w, y + h2));
                self.cubic_to(p(x + w, y + h2 - h2k), p(x + w2 + w2k, y), p(x + w2, y));
            }
        }
        self.close();
    }

    /// Append a circle of radius `r` centered at `c`.
    pub fn add_circle(&mut self, c: Point, r: f64, dir: Direction) {
        self.add_oval(Rect::new(c.x - r, c.y - r, c.x + r, c.y + r), dir);
    }

    /// Append an elliptic arc inscribed in `rect`.
    ///
    /// Angles are in degrees, zero at 3 o'clock, positive counter-clockwise on screen.
    /// The arc is connected to the current point with a line unless `force_move`
    /// is set or there is no current subpath.
    pub fn arc_to(&mut self, rect: Rect, start_angle: f64, sweep: f64, force_move: bool) {
        let cx = rect.center().x;
        let cy = rect.center().y;
        let rx = rect.width() / 2.0;
        let ry = rect.height() / 2.0;
        let at = |deg: f64| {
            let a = deg.to_radians();
            Point::new(cx + rx * a.cos(), cy - ry * a.sin())
        };
        let tangent = |deg: f64| {
            let a = deg.to_radians();
            (-rx * a.sin(), -ry * a.cos())
        };

        let start = at(start_angle);
        if force_move || self.d.new_segment {
            self.move_to(start);
        } else {
            self.line_to(start);
        }
        if fuzzy_zero(sweep) || fuzzy_zero(rx) || fuzzy_zero(ry) {
            return;
        }

        let pieces = (sweep.abs() / 90.0).ceil().max(1.0) as usize;
        let step = sweep / pieces as f64;
        let k = 4.0 / 3.0 * (step.to_radians() / 4.0).tan();
        let mut a0 = start_angle;
        for _ in 0..pieces {
            let a1 = a0 + step;
            let p0 = at(a0);
            let p3 = at(a1);
            let (d0x, d0y) = tangent(a0);
            let (d1x, d1y) = tangent(a1);
            self.cubic_to(
                Point::new(p0.x + k * d0x, p0.y + k * d0y),
                Point::new(p3.x - k * d1x, p3.y - k * d1y),
                p3,
            );
            a0 = a1;
        }
    }

    /// Append a star centered at `c`.
    ///
    /// `points` may be fractional; the partial point is drawn scaled between the
    /// inner and outer radius. Roundness values are percentages.
    #[allow(clippy::too_many_arguments)]
    pub fn add_polystar(
        &mut self,
        points: f64,
        inner_radius: f64,
        outer_radius: f64,
        inner_roundness: f64,
        outer_roundness: f64,
        start_angle: f64,
        c: Point,
        dir: Direction,
    ) {
        if points <= 0.0 || !points.is_finite() {
            return;
        }
        let mut current_angle = (start_angle - 90.0).to_radians();
        let angle_per_point = 2.0 * PI / points;
        let half_angle_per_point = angle_per_point / 2.0;
        let partial = points - points.floor();
        let num_points = (points.ceil() as usize) * 2;
        let angle_dir = if dir == Direction::Cw { 1.0 } else { -1.0 };
        let inner_roundness = inner_roundness / 100.0;
        let outer_roundness = outer_roundness / 100.0;
        let has_roundness = !fuzzy_zero(inner_roundness) || !fuzzy_zero(outer_roundness);
        let mut long_segment = false;
        let mut partial_radius = 0.0;

        if partial != 0.0 {
            current_angle += half_angle_per_point * (1.0 - partial) * angle_dir;
        }

        let (mut x, mut y);
        if partial != 0.0 {
            partial_radius = inner_radius + partial * (outer_radius - inner_radius);
            x = partial_radius * current_angle.cos();
            y = partial_radius * current_angle.sin();
            current_angle += angle_per_point * partial / 2.0 * angle_dir;
        } else {
            x = outer_radius * current_angle.cos();
            y = outer_radius * current_angle.sin();
            current_angle += half_angle_per_point * angle_dir;
        }

        self.move_to(Point::new(x + c.x, y + c.y));

        for i in 0..num_points {
            let mut radius = if long_segment { outer_radius } else { inner_radius };
            let mut d_theta = half_angle_per_point;
            if partial_radius != 0.0 && i == num_points - 2 {
                d_theta = angle_per_point * partial / 2.0;
            }
            if partial_radius != 0.0 && i == num_points - 1 {
                radius = partial_radius;
            }
            let (prev_x, prev_y) = (x, y);
            x = radius * current_angle.cos();
            y = radius * current_angle.sin();

            if has_roundness {
                let cp1_theta = prev_y.atan2(prev_x) - FRAC_PI_2 * angle_dir;
                let cp2_theta = y.atan2(x) - FRAC_PI_2 * angle_dir;
                let (cp1_roundness, cp2_roundness) = if long_segment {
                    (inner_roundness, outer_roundness)
                } else {
                    (outer_roundness, inner_roundness)
                };
                let (cp1_radius, cp2_radius) = if long_segment {
                    (inner_radius, outer_radius)
                } else {
                    (outer_radius, inner_radius)
                };
                let s1 = cp1_radius * cp1_roundness * POLYSTAR_MAGIC / points;
                let s2 = cp2_radius * cp2_roundness * POLYSTAR_MAGIC / points;
                let mut cp1 = (s1 * cp1_theta.cos(), s1 * cp1_theta.sin());
                let mut cp2 = (s2 * cp2_theta.cos(), s2 * cp2_theta.sin());
                if partial != 0.0 && (i == 0 || i == num_points - 1) {
                    cp1 = (cp1.0 * partial, cp1.1 * partial);
                    cp2 = (cp2.0 * partial, cp2.1 * partial);
                }
                self.cubic_to(
                    Point::new(prev_x - cp1.0 + c.x, prev_y - cp1.1 + c.y),
                    Point::new(x + cp2.0 + c.x, y + cp2.1 + c.y),
                    Point::new(x + c.x, y + c.y),
                );
            } else {
                self.line_to(Point::new(x + c.x, y + c.y));
            }

            current_angle += d_theta * angle_dir;
            long_segment = !long_segment;
        }
        self.close();
    }

    /// Append a regular polygon centered at `c`. Fractional point counts are floored.
    pub fn add_polygon(
        &mut self,
        points: f64,
        radius: f64,
        roundness: f64,
        start_angle: f64,
        c: Point,
        dir: Direction,
    ) {
        let num_points = if points.is_finite() { points.floor() } else { 0.0 };
        if num_points < 1.0 {
            return;
        }
        let mut current_angle = (start_angle - 90.0).to_radians();
        let angle_per_point = 2.0 * PI / num_points;
        let angle_dir = if dir == Direction::Cw { 1.0 } else { -1.0 };
        let roundness = roundness / 100.0;
        let has_roundness = !fuzzy_zero(roundness);

        let mut x = radius * current_angle.cos();
        let mut y = radius * current_angle.sin();
        current_angle += angle_per_point * angle_dir;

        self.move_to(Point::new(x + c.x, y + c.y));
        for _ in 0..num_points as usize {
            let (prev_x, prev_y) = (x, y);
            x = radius * current_angle.cos();
            y = radius * current_angle.sin();
            if has_roundness {
                let cp1_theta = prev_y.atan2(prev_x) - FRAC_PI_2 * angle_dir;
                let cp2_theta = y.atan2(x) - FRAC_PI_2 * angle_dir;
                let s = radius * roundness * POLYGON_MAGIC;
                self.cubic_to(
                    Point::new(prev_x - s * cp1_theta.cos() + c.x, prev_y - s * cp1_theta.sin() + c.y),
                    Point::new(x + s * cp2_theta.cos() + c.x, y + s * cp2_theta.sin() + c.y),
                    Point::new(x + c.x, y + c.y),
                );
            } else {
                self.line_to(Point::new(x + c.x, y + c.y));
            }
            current_angle += angle_per_point * angle_dir;
        }
        self.close();
    }

    /// Convert to a `kurbo` path for stroking.
    pub fn to_bez_path(&self) -> kurbo::BezPath {
        let mut out = kurbo::BezPath::new();
        for seg in self.segments_iter() {
            match seg {
                Segment::Move(p) => out.move_to(p),
                Segment::Line(_, p) => out.line_to(p),
                Segment::Cubic(b) => out.curve_to(b.p1, b.p2, b.p3),
                Segment::Close => out.close_path(),
            }
        }
        out
    }

    /// Build from a `kurbo` path; quadratic segments are raised to cubics.
    pub fn from_bez_path(path: &kurbo::BezPath) -> VPath {
        let mut out = VPath::new();
        let mut cur = Point::ORIGIN;
        for el in path.elements() {
            match *el {
                kurbo::PathEl::MoveTo(p) => {
                    out.move_to(p);
                    cur = p;
                }
                kurbo::PathEl::LineTo(p) => {
                    out.line_to(p);
                    cur = p;
                }
                kurbo::PathEl::QuadTo(q, p) => {
                    let c1 = cur + (q - cur) * (2.0 / 3.0);
                    let c2 = p + (q - p) * (2.0 / 3.0);
                    out.cubic_to(c1, c2, p);
                    cur = p;
                }
                kurbo::PathEl::CurveTo(c1, c2, p) => {
                    out.cubic_to(c1, c2, p);
                    cur = p;
                }
                kurbo::PathEl::ClosePath => out.close(),
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/path.rs"]
mod tests;
