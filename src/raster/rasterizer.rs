//! Scanline rasterizer: path outline to antialiased coverage spans.
//!
//! Edges are accumulated into per-pixel cells holding the signed cover (sum of
//! vertical deltas) and twice the signed area covered inside the cell, both in
//! 26.6 fixed point. Sweeping a scanline left to right turns the running cover
//! and the cell area into coverage values.

use crate::foundation::core::{IRect, Point};
use crate::geometry::{Bezier, Segment, StrokeStyle, VPath, stroke_outline};
use crate::raster::rle::{Span, VRle, push_span};

const SUBPIXEL_SHIFT: i32 = 6;
const SUBPIXEL_SCALE: i32 = 1 << SUBPIXEL_SHIFT;
const SUBPIXEL_MASK: i32 = SUBPIXEL_SCALE - 1;

const AA_SHIFT: i32 = 8;
const AA_SCALE: i32 = 1 << AA_SHIFT;
const AA_MASK: i32 = AA_SCALE - 1;
const AA_SCALE2: i32 = AA_SCALE * 2;
const AA_MASK2: i32 = AA_SCALE2 - 1;

const DX_LIMIT: i64 = 16384 << SUBPIXEL_SHIFT;
const FLATNESS: f64 = 0.25;
const MAX_FLATTEN_DEPTH: u32 = 16;
// Keeps fixed-point coordinates and cell areas well inside i32.
const COORD_LIMIT: i32 = 1 << 22;

/// Rule deciding which regions of a self-overlapping path are inside.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FillRule {
    /// Inside where the winding number is non-zero.
    #[default]
    NonZero,
    /// Inside where the winding number is odd.
    EvenOdd,
}

#[derive(Clone, Copy, Debug)]
struct Cell {
    x: i32,
    y: i32,
    cover: i32,
    area: i32,
}

impl Cell {
    const INITIAL: Cell = Cell {
        x: i32::MAX,
        y: i32::MAX,
        cover: 0,
        area: 0,
    };
}

/// Reusable rasterizer; keeps its cell buffer between calls.
#[derive(Debug)]
pub struct Rasterizer {
    cells: Vec<Cell>,
    curr: Cell,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer {
    /// New rasterizer with an empty cell buffer.
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            curr: Cell::INITIAL,
        }
    }

    fn reset(&mut self) {
        self.cells.clear();
        self.curr = Cell::INITIAL;
    }

    /// Coverage of the filled interior of `path`.
    ///
    /// Open subpaths are closed implicitly. With no `clip` the path bounds
    /// are used.
    pub fn fill(&mut self, path: &VPath, rule: FillRule, clip: Option<IRect>) -> VRle {
        if path.is_empty() {
            return VRle::new();
        }
        let clip = match clip {
            Some(c) => c,
            None => bounds_of(path),
        };
        let clip = clip.intersect(IRect::new(
            -COORD_LIMIT,
            -COORD_LIMIT,
            2 * COORD_LIMIT,
            2 * COORD_LIMIT,
        ));
        if clip.is_empty() {
            return VRle::new();
        }

        self.reset();
        let clipper = Clipper::new(clip);
        for (a, b) in flatten(path) {
            clipper.clip(a, b, |p, q| {
                self.line(to_fixed(p.x), to_fixed(p.y), to_fixed(q.x), to_fixed(q.y));
            });
        }
        self.add_curr_cell();
        self.sweep(rule, clip)
    }

    /// Coverage of the stroke of `path`.
    pub fn stroke(&mut self, path: &VPath, style: &StrokeStyle, clip: Option<IRect>) -> VRle {
        let outline = stroke_outline(path, style);
        self.fill(&outline, FillRule::NonZero, clip)
    }

    fn add_curr_cell(&mut self) {
        if self.curr.area | self.curr.cover != 0 {
            self.cells.push(self.curr);
        }
    }

    fn set_curr_cell(&mut self, x: i32, y: i32) {
        if self.curr.x != x || self.curr.y != y {
            self.add_curr_cell();
            self.curr = Cell {
                x,
                y,
                cover: 0,
                area: 0,
            };
        }
    }

    // Edge fragment inside scanline `ey`; `y1`, `y2` are sub-scanline offsets.
    fn render_hline(&mut self, ey: i32, x1: i32, y1: i32, x2: i32, y2: i32) {
        let ex1 = x1 >> SUBPIXEL_SHIFT;
        let ex2 = x2 >> SUBPIXEL_SHIFT;
        let fx1 = x1 & SUBPIXEL_MASK;
        let fx2 = x2 & SUBPIXEL_MASK;

        if y1 == y2 {
            self.set_curr_cell(ex2, ey);
            return;
        }

        if ex1 == ex2 {
            let delta = y2 - y1;
            self.curr.cover += delta;
            self.curr.area += (fx1 + fx2) * delta;
            return;
        }

        let mut p = i64::from(SUBPIXEL_SCALE - fx1) * i64::from(y2 - y1);
        let mut first = SUBPIXEL_SCALE;
        let mut incr = 1;
        let mut dx = i64::from(x2) - i64::from(x1);
        if dx < 0 {
            p = i64::from(fx1) * i64::from(y2 - y1);
            first = 0;
            incr = -1;
            dx = -dx;
        }

        let mut delta = (p / dx) as i32;
        let mut modulo = p % dx;
        if modulo < 0 {
            delta -= 1;
            modulo += dx;
        }

        self.curr.cover += delta;
        self.curr.area += (fx1 + first) * delta;

        let mut ex = ex1 + incr;
        self.set_curr_cell(ex, ey);
        let mut y = y1 + delta;

        if ex != ex2 {
            p = i64::from(SUBPIXEL_SCALE) * i64::from(y2 - y + delta);
            let mut lift = (p / dx) as i32;
            let mut rem = p % dx;
            if rem < 0 {
                lift -= 1;
                rem += dx;
            }
            modulo -= dx;

            while ex != ex2 {
                delta = lift;
                modulo += rem;
                if modulo >= 0 {
                    modulo -= dx;
                    delta += 1;
                }
                self.curr.cover += delta;
                self.curr.area += SUBPIXEL_SCALE * delta;
                y += delta;
                ex += incr;
                self.set_curr_cell(ex, ey);
            }
        }
        delta = y2 - y;
        self.curr.cover += delta;
        self.curr.area += (fx2 + SUBPIXEL_SCALE - first) * delta;
    }

    // One edge in 26.6 fixed point.
    fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let dx = i64::from(x2) - i64::from(x1);
        if dx >= DX_LIMIT || dx <= -DX_LIMIT {
            let cx = ((i64::from(x1) + i64::from(x2)) >> 1) as i32;
            let cy = ((i64::from(y1) + i64::from(y2)) >> 1) as i32;
            self.line(x1, y1, cx, cy);
            self.line(cx, cy, x2, y2);
            return;
        }

        let dy = i64::from(y2) - i64::from(y1);
        let ex1 = x1 >> SUBPIXEL_SHIFT;
        let mut ey1 = y1 >> SUBPIXEL_SHIFT;
        let ey2 = y2 >> SUBPIXEL_SHIFT;
        let fy1 = y1 & SUBPIXEL_MASK;
        let fy2 = y2 & SUBPIXEL_MASK;

        self.set_curr_cell(ex1, ey1);

        if ey1 == ey2 {
            self.render_hline(ey1, x1, fy1, x2, fy2);
            return;
        }

        let mut incr = 1;
        if dx == 0 {
            let two_fx = (x1 - (ex1 << SUBPIXEL_SHIFT)) << 1;
            let mut first = SUBPIXEL_SCALE;
            if dy < 0 {
                first = 0;
                incr = -1;
            }

            let mut delta = first - fy1;
            self.curr.cover += delta;
            self.curr.area += two_fx * delta;
            ey1 += incr;
            self.set_curr_cell(ex1, ey1);

            delta = first + first - SUBPIXEL_SCALE;
            let area = two_fx * delta;
            while ey1 != ey2 {
                self.curr.cover = delta;
                self.curr.area = area;
                ey1 += incr;
                self.set_curr_cell(ex1, ey1);
            }
            delta = fy2 - SUBPIXEL_SCALE + first;
            self.curr.cover += delta;
            self.curr.area += two_fx * delta;
            return;
        }

        let mut p = i64::from(SUBPIXEL_SCALE - fy1) * dx;
        let mut first = SUBPIXEL_SCALE;
        let mut dy_abs = dy;
        if dy < 0 {
            p = i64::from(fy1) * dx;
            first = 0;
            incr = -1;
            dy_abs = -dy;
        }

        let mut delta = (p / dy_abs) as i32;
        let mut modulo = p % dy_abs;
        if modulo < 0 {
            delta -= 1;
            modulo += dy_abs;
        }

        let mut x_from = x1 + delta;
        self.render_hline(ey1, x1, fy1, x_from, first);
        ey1 += incr;
        self.set_curr_cell(x_from >> SUBPIXEL_SHIFT, ey1);

        if ey1 != ey2 {
            p = i64::from(SUBPIXEL_SCALE) * dx;
            let mut lift = (p / dy_abs) as i32;
            let mut rem = p % dy_abs;
            if rem < 0 {
                lift -= 1;
                rem += dy_abs;
            }
            modulo -= dy_abs;

            while ey1 != ey2 {
                delta = lift;
                modulo += rem;
                if modulo >= 0 {
                    modulo -= dy_abs;
                    delta += 1;
                }
                let x_to = x_from + delta;
                self.render_hline(ey1, x_from, SUBPIXEL_SCALE - first, x_to, first);
                x_from = x_to;
                ey1 += incr;
                self.set_curr_cell(x_from >> SUBPIXEL_SHIFT, ey1);
            }
        }
        self.render_hline(ey1, x_from, SUBPIXEL_SCALE - first, x2, fy2);
    }

    fn sweep(&mut self, rule: FillRule, clip: IRect) -> VRle {
        self.cells.sort_unstable_by_key(|c| (c.y, c.x));

        let mut out = Vec::new();
        let emit = |out: &mut Vec<Span>, x: i32, y: i32, len: i32, alpha: u8| {
            if y < clip.y || y >= clip.bottom() {
                return;
            }
            let x0 = x.max(clip.x);
            let x1 = (x + len).min(clip.right());
            if x1 > x0 {
                push_span(out, Span::new(x0, y, (x1 - x0) as u32, alpha));
            }
        };

        for row in self.cells.chunk_by(|a, b| a.y == b.y) {
            let y = row[0].y;
            let mut cover = 0;
            let mut i = 0;
            while i < row.len() {
                let x = row[i].x;
                let mut area = 0;
                while i < row.len() && row[i].x == x {
                    cover += row[i].cover;
                    area += row[i].area;
                    i += 1;
                }

                let mut next_x = x;
                if area != 0 {
                    let alpha = coverage(rule, (cover << (SUBPIXEL_SHIFT + 1)) - area);
                    emit(&mut out, x, y, 1, alpha);
                    next_x = x + 1;
                }
                if let Some(next) = row.get(i)
                    && next.x > next_x
                {
                    let alpha = coverage(rule, cover << (SUBPIXEL_SHIFT + 1));
                    emit(&mut out, next_x, y, next.x - next_x, alpha);
                }
            }
        }
        VRle::from_spans(out)
    }
}

/// Fill `path` with a fresh rasterizer.
pub fn fill_path(path: &VPath, rule: FillRule, clip: Option<IRect>) -> VRle {
    Rasterizer::new().fill(path, rule, clip)
}

/// Stroke `path` with a fresh rasterizer.
pub fn stroke_path(path: &VPath, style: &StrokeStyle, clip: Option<IRect>) -> VRle {
    Rasterizer::new().stroke(path, style, clip)
}

fn coverage(rule: FillRule, area: i32) -> u8 {
    let mut cover = (area >> (SUBPIXEL_SHIFT * 2 + 1 - AA_SHIFT)).abs();
    if rule == FillRule::EvenOdd {
        cover &= AA_MASK2;
        if cover > AA_SCALE {
            cover = AA_SCALE2 - cover;
        }
    }
    cover.min(AA_MASK) as u8
}

fn to_fixed(v: f64) -> i32 {
    (v * f64::from(SUBPIXEL_SCALE)).round() as i32
}

fn bounds_of(path: &VPath) -> IRect {
    let r = path.bounding_rect();
    let x0 = r.x0.floor() as i32;
    let y0 = r.y0.floor() as i32;
    let x1 = r.x1.ceil() as i32 + 1;
    let y1 = r.y1.ceil() as i32 + 1;
    IRect::new(x0, y0, x1 - x0, y1 - y0)
}

// Polyline edges of `path`, every subpath closed.
fn flatten(path: &VPath) -> Vec<(Point, Point)> {
    let mut edges = Vec::new();
    let mut start = Point::ORIGIN;
    let mut cur = Point::ORIGIN;
    let mut open = false;
    for seg in path.segments_iter() {
        match seg {
            Segment::Move(p) => {
                if open && cur != start {
                    edges.push((cur, start));
                }
                start = p;
                cur = p;
                open = true;
            }
            Segment::Line(a, b) => {
                edges.push((a, b));
                cur = b;
            }
            Segment::Cubic(b) => {
                flatten_cubic(&b, 0, &mut edges);
                cur = b.p3;
            }
            Segment::Close => {
                if cur != start {
                    edges.push((cur, start));
                }
                cur = start;
            }
        }
    }
    if open && cur != start {
        edges.push((cur, start));
    }
    edges
}

fn flatten_cubic(b: &Bezier, depth: u32, edges: &mut Vec<(Point, Point)>) {
    if depth >= MAX_FLATTEN_DEPTH || b.is_flat(FLATNESS) {
        edges.push((b.p0, b.p3));
        return;
    }
    let (l, r) = b.split(0.5);
    flatten_cubic(&l, depth + 1, edges);
    flatten_cubic(&r, depth + 1, edges);
}

// Restricts edges to the clip box. Parts above or below are dropped; parts
// left or right are pushed onto the box edge so the winding they contribute
// to the visible area is kept.
struct Clipper {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

impl Clipper {
    fn new(clip: IRect) -> Self {
        Self {
            x0: f64::from(clip.x),
            y0: f64::from(clip.y),
            x1: f64::from(clip.right()),
            y1: f64::from(clip.bottom()),
        }
    }

    fn clip(&self, a: Point, b: Point, mut emit: impl FnMut(Point, Point)) {
        if a.y == b.y || !a.is_finite() || !b.is_finite() {
            return;
        }
        if (a.y <= self.y0 && b.y <= self.y0) || (a.y >= self.y1 && b.y >= self.y1) {
            return;
        }
        let at_y = |y: f64| {
            let t = (y - a.y) / (b.y - a.y);
            Point::new(a.x + (b.x - a.x) * t, y)
        };
        let a = if a.y < self.y0 {
            at_y(self.y0)
        } else if a.y > self.y1 {
            at_y(self.y1)
        } else {
            a
        };
        let b = if b.y < self.y0 {
            at_y(self.y0)
        } else if b.y > self.y1 {
            at_y(self.y1)
        } else {
            b
        };

        let mut ts = [0.0, 1.0, 1.0, 1.0];
        let mut n = 1;
        if b.x != a.x {
            for edge in [self.x0, self.x1] {
                let t = (edge - a.x) / (b.x - a.x);
                if t > 0.0 && t < 1.0 {
                    ts[n] = t;
                    n += 1;
                }
            }
        }
        ts[n] = 1.0;
        ts[..=n].sort_by(f64::total_cmp);

        let clamp = |p: Point| Point::new(p.x.clamp(self.x0, self.x1), p.y);
        let lerp = |t: f64| a.lerp(b, t);
        for w in ts[..=n].windows(2) {
            if w[1] > w[0] {
                emit(clamp(lerp(w[0])), clamp(lerp(w[1])));
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/rasterizer.rs"]
mod tests;
