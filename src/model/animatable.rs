use std::sync::Arc;

use crate::foundation::core::{Color, Point, Vec2};
use crate::geometry::Bezier;
use crate::model::content::{GradientData, ShapeData};

/// Linear interpolation between two values of the same kind.
pub trait Lerp: Sized + Default {
    /// Value at `t` between `a` (0) and `b` (1).
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;

    /// Interpolate along a spatial curve when the keyframe carries tangents.
    ///
    /// Only positions are spatial; everything else falls back to [`Lerp::lerp`].
    fn lerp_spatial(a: &Self, b: &Self, t: f64, _tangents: Option<&Tangents>) -> Self {
        Self::lerp(a, b, t)
    }
}

impl Lerp for f32 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        (f64::from(*a) + (f64::from(*b) - f64::from(*a)) * t) as f32
    }
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

impl Lerp for Point {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a.lerp(*b, t)
    }

    fn lerp_spatial(a: &Self, b: &Self, t: f64, tangents: Option<&Tangents>) -> Self {
        let Some(tan) = tangents.filter(|tan| !tan.is_zero()) else {
            return a.lerp(*b, t);
        };
        let curve = Bezier::new(*a, *a + tan.out, *b + tan.inn, *b);
        let len = curve.length();
        curve.point_at(curve.t_at_length(t * len, len))
    }
}

impl Lerp for Color {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Color {
            r: f32::lerp(&a.r, &b.r, t),
            g: f32::lerp(&a.g, &b.g, t),
            b: f32::lerp(&a.b, &b.b, t),
            a: f32::lerp(&a.a, &b.a, t),
        }
    }
}

impl Lerp for ShapeData {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        if a.points.len() != b.points.len() {
            return a.clone();
        }
        ShapeData {
            points: a
                .points
                .iter()
                .zip(&b.points)
                .map(|(p, q)| p.lerp(*q, t))
                .collect(),
            closed: a.closed,
        }
    }
}

impl Lerp for GradientData {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        if a.0.len() != b.0.len() {
            return a.clone();
        }
        GradientData(a.0.iter().zip(&b.0).map(|(x, y)| f32::lerp(x, y, t)).collect())
    }
}

/// Spatial tangents of a position keyframe, relative to its endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tangents {
    /// Out tangent of the start value.
    pub out: Vec2,
    /// In tangent of the end value.
    pub inn: Vec2,
}

impl Tangents {
    fn is_zero(&self) -> bool {
        self.out.hypot2() == 0.0 && self.inn.hypot2() == 0.0
    }
}

/// Easing curve from `(0, 0)` to `(1, 1)` through two control points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interpolator {
    /// First control point.
    pub out: Point,
    /// Second control point.
    pub inn: Point,
}

impl Interpolator {
    /// Curve through the given control points.
    pub fn new(out: Point, inn: Point) -> Self {
        Self { out, inn }
    }

    /// Eased progress for linear progress `t`.
    pub fn value(&self, t: f64) -> f64 {
        cubic_bezier_ease(t, self.out.x, self.out.y, self.inn.x, self.inn.y)
    }

    pub(crate) fn key(&self) -> [u64; 4] {
        [
            self.out.x.to_bits(),
            self.out.y.to_bits(),
            self.inn.x.to_bits(),
            self.inn.y.to_bits(),
        ]
    }
}

/// One interpolation interval.
#[derive(Clone, Debug, PartialEq)]
pub struct Keyframe<T> {
    /// First frame of the interval.
    pub start_frame: f32,
    /// Frame at which `end` is reached.
    pub end_frame: f32,
    /// Value at `start_frame`.
    pub start: T,
    /// Value at `end_frame`.
    pub end: T,
    /// Easing curve; `None` holds `start` for the whole interval.
    pub interpolator: Option<Arc<Interpolator>>,
    /// Motion-path tangents for positions.
    pub tangents: Option<Tangents>,
}

impl<T: Lerp + Clone> Keyframe<T> {
    fn value(&self, frame: f32) -> T {
        let Some(interp) = &self.interpolator else {
            return self.start.clone();
        };
        let span = f64::from(self.end_frame - self.start_frame);
        if span <= 0.0 {
            return self.end.clone();
        }
        let progress = interp.value(f64::from(frame - self.start_frame) / span);
        T::lerp_spatial(&self.start, &self.end, progress, self.tangents.as_ref())
    }
}

/// A property that is either constant or keyframe-interpolated.
#[derive(Clone, Debug, PartialEq)]
pub enum Animatable<T> {
    /// Same value on every frame.
    Constant(T),
    /// Keyframes sorted by `start_frame`, never empty.
    Keyframed(Vec<Keyframe<T>>),
}

impl<T: Default> Default for Animatable<T> {
    fn default() -> Self {
        Self::Constant(T::default())
    }
}

impl<T: Lerp + Clone> Animatable<T> {
    /// Value at `frame`, clamped to the first and last keyframe.
    pub fn value(&self, frame: f32) -> T {
        match self {
            Self::Constant(v) => v.clone(),
            Self::Keyframed(keys) => {
                let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
                    debug_assert!(false, "keyframed property without keyframes");
                    return T::default();
                };
                if frame <= first.start_frame {
                    return first.start.clone();
                }
                if frame >= last.end_frame {
                    return last.end.clone();
                }
                let idx = keys.partition_point(|k| k.start_frame <= frame);
                let key = &keys[idx.saturating_sub(1)];
                if frame >= key.end_frame {
                    return key.end.clone();
                }
                key.value(frame)
            }
        }
    }
}

impl<T> Animatable<T> {
    /// Return `true` when the value never changes.
    pub fn is_static(&self) -> bool {
        matches!(self, Self::Constant(_))
    }

    /// Keyframe list, empty for constants.
    pub fn keyframes(&self) -> &[Keyframe<T>] {
        match self {
            Self::Constant(_) => &[],
            Self::Keyframed(keys) => keys,
        }
    }
}

pub(crate) fn cubic_bezier_ease(x: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    fn sample_curve(a1: f64, a2: f64, t: f64) -> f64 {
        let omt = 1.0 - t;
        3.0 * omt * omt * t * a1 + 3.0 * omt * t * t * a2 + t * t * t
    }
    fn sample_curve_derivative(a1: f64, a2: f64, t: f64) -> f64 {
        let omt = 1.0 - t;
        3.0 * omt * omt * a1 + 6.0 * omt * t * (a2 - a1) + 3.0 * t * t * (1.0 - a2)
    }

    // Newton-Raphson, then bisection for flat derivative regions.
    let mut t = x;
    for _ in 0..8 {
        let x_t = sample_curve(x1, x2, t) - x;
        if x_t.abs() < 1e-7 {
            return sample_curve(y1, y2, t);
        }
        let d = sample_curve_derivative(x1, x2, t);
        if d.abs() < 1e-7 {
            break;
        }
        t = (t - x_t / d).clamp(0.0, 1.0);
    }

    let mut lo = 0.0;
    let mut hi = 1.0;
    t = x;
    for _ in 0..32 {
        let x_t = sample_curve(x1, x2, t);
        if (x_t - x).abs() < 1e-7 {
            break;
        }
        if x_t < x {
            lo = t;
        } else {
            hi = t;
        }
        t = 0.5 * (lo + hi);
    }

    sample_curve(y1, y2, t)
}

#[cfg(test)]
#[path = "../../tests/unit/model/animatable.rs"]
mod tests;
