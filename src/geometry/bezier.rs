use crate::foundation::core::Point;

const LENGTH_TOLERANCE: f64 = 0.01;
const MAX_DEPTH: u32 = 24;

/// Cubic Bezier segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bezier {
    /// Start point.
    pub p0: Point,
    /// First control point.
    pub p1: Point,
    /// Second control point.
    pub p2: Point,
    /// End point.
    pub p3: Point,
}

impl Bezier {
    /// Build a segment from its four points.
    pub fn new(p0: Point, p1: Point, p2: Point, p3: Point) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Point at parameter `t` in `[0, 1]`.
    pub fn point_at(&self, t: f64) -> Point {
        let mt = 1.0 - t;
        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;
        Point::new(
            a * self.p0.x + b * self.p1.x + c * self.p2.x + d * self.p3.x,
            a * self.p0.y + b * self.p1.y + c * self.p2.y + d * self.p3.y,
        )
    }

    /// Arc length by recursive chord / control-polygon subdivision.
    pub fn length(&self) -> f64 {
        self.length_rec(0)
    }

    fn length_rec(&self, depth: u32) -> f64 {
        let chord = self.p0.distance(self.p3);
        let poly =
            self.p0.distance(self.p1) + self.p1.distance(self.p2) + self.p2.distance(self.p3);
        if poly - chord > LENGTH_TOLERANCE && depth < MAX_DEPTH {
            let (left, right) = self.split(0.5);
            left.length_rec(depth + 1) + right.length_rec(depth + 1)
        } else {
            (poly + chord) / 2.0
        }
    }

    /// De Casteljau split at `t`.
    pub fn split(&self, t: f64) -> (Bezier, Bezier) {
        let ab = self.p0.lerp(self.p1, t);
        let bc = self.p1.lerp(self.p2, t);
        let cd = self.p2.lerp(self.p3, t);
        let abc = ab.lerp(bc, t);
        let bcd = bc.lerp(cd, t);
        let mid = abc.lerp(bcd, t);
        (
            Bezier::new(self.p0, ab, abc, mid),
            Bezier::new(mid, bcd, cd, self.p3),
        )
    }

    /// Parameter at which the arc length from the start equals `len`.
    ///
    /// `total` is the precomputed length of the whole segment.
    pub fn t_at_length(&self, len: f64, total: f64) -> f64 {
        if len <= 0.0 {
            return 0.0;
        }
        if len >= total {
            return 1.0;
        }
        let mut lo = 0.0;
        let mut hi = 1.0;
        let mut t = len / total;
        for _ in 0..64 {
            let l = self.split(t).0.length();
            if (l - len).abs() < LENGTH_TOLERANCE {
                break;
            }
            if l < len {
                lo = t;
            } else {
                hi = t;
            }
            t = 0.5 * (lo + hi);
        }
        t
    }

    /// Split at an arc length measured from the start.
    pub fn split_at_length(&self, len: f64) -> (Bezier, Bezier) {
        let total = self.length();
        self.split(self.t_at_length(len, total))
    }

    /// Sub-segment between parameters `t0 < t1`.
    pub fn on_interval(&self, t0: f64, t1: f64) -> Bezier {
        if t1 <= t0 {
            let p = self.point_at(t0);
            return Bezier::new(p, p, p, p);
        }
        let (_, right) = self.split(t0);
        let local = if t0 >= 1.0 { 0.0 } else { (t1 - t0) / (1.0 - t0) };
        right.split(local.clamp(0.0, 1.0)).0
    }

    /// Return `true` when the control polygon is flat within `tolerance`.
    pub fn is_flat(&self, tolerance: f64) -> bool {
        let ux = 3.0 * self.p1.x - 2.0 * self.p0.x - self.p3.x;
        let uy = 3.0 * self.p1.y - 2.0 * self.p0.y - self.p3.y;
        let vx = 3.0 * self.p2.x - self.p0.x - 2.0 * self.p3.x;
        let vy = 3.0 * self.p2.y - self.p0.y - 2.0 * self.p3.y;
        let d = (ux * ux).max(vx * vx) + (uy * uy).max(vy * vy);
        d <= 16.0 * tolerance * tolerance
    }
}

/// Split the line `a -> b` at an arc length from `a`.
pub(crate) fn split_line_at_length(a: Point, b: Point, len: f64) -> Point {
    let total = a.distance(b);
    if total <= 0.0 {
        return a;
    }
    a.lerp(b, (len / total).clamp(0.0, 1.0))
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/bezier.rs"]
mod tests;
