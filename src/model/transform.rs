use crate::foundation::core::{Affine, Point, Vec2};
use crate::model::animatable::Animatable;

/// Layer or group position, animated as one point or per axis.
#[derive(Clone, Debug, PartialEq)]
pub enum Position {
    /// Single point property, may follow a motion path.
    Combined(Animatable<Point>),
    /// Separately animated x and y.
    Split {
        /// Horizontal component.
        x: Animatable<f32>,
        /// Vertical component.
        y: Animatable<f32>,
    },
}

impl Default for Position {
    fn default() -> Self {
        Self::Combined(Animatable::Constant(Point::ORIGIN))
    }
}

impl Position {
    /// Position at `frame`.
    pub fn value(&self, frame: f32) -> Point {
        match self {
            Self::Combined(p) => p.value(frame),
            Self::Split { x, y } => Point::new(f64::from(x.value(frame)), f64::from(y.value(frame))),
        }
    }

    fn is_static(&self) -> bool {
        match self {
            Self::Combined(p) => p.is_static(),
            Self::Split { x, y } => x.is_static() && y.is_static(),
        }
    }
}

/// Animated 2D transform: anchor, position, scale, rotation, skew and opacity.
///
/// Scale and opacity are percentages, angles are degrees.
#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    /// Point the transform pivots around.
    pub anchor: Animatable<Point>,
    /// Translation.
    pub position: Position,
    /// Scale in percent.
    pub scale: Animatable<Vec2>,
    /// Clockwise rotation.
    pub rotation: Animatable<f32>,
    /// Opacity in percent.
    pub opacity: Animatable<f32>,
    /// Skew angle.
    pub skew: Animatable<f32>,
    /// Direction the skew is applied along.
    pub skew_axis: Animatable<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            anchor: Animatable::Constant(Point::ORIGIN),
            position: Position::default(),
            scale: Animatable::Constant(Vec2::new(100.0, 100.0)),
            rotation: Animatable::Constant(0.0),
            opacity: Animatable::Constant(100.0),
            skew: Animatable::Constant(0.0),
            skew_axis: Animatable::Constant(0.0),
        }
    }
}

impl Transform {
    /// Local matrix at `frame`: `translate(p) * rotate * skew * scale * translate(-anchor)`.
    pub fn matrix(&self, frame: f32) -> Affine {
        let anchor = self.anchor.value(frame);
        let pos = self.position.value(frame);
        let scale = self.scale.value(frame);
        let rotation = f64::from(self.rotation.value(frame)).to_radians();
        Affine::translate(pos.to_vec2())
            * Affine::rotate(rotation)
            * self.skew_matrix(frame)
            * Affine::scale_non_uniform(scale.x / 100.0, scale.y / 100.0)
            * Affine::translate(-anchor.to_vec2())
    }

    fn skew_matrix(&self, frame: f32) -> Affine {
        let skew = f64::from(self.skew.value(frame));
        if skew == 0.0 {
            return Affine::IDENTITY;
        }
        let axis = f64::from(self.skew_axis.value(frame)).to_radians();
        let shear = (-skew.to_radians()).tan();
        Affine::rotate(axis) * Affine::skew(shear, 0.0) * Affine::rotate(-axis)
    }

    /// Opacity at `frame` in `[0, 1]`.
    pub fn opacity(&self, frame: f32) -> f32 {
        (self.opacity.value(frame) / 100.0).clamp(0.0, 1.0)
    }

    /// Return `true` when no component is animated.
    pub fn is_static(&self) -> bool {
        self.anchor.is_static()
            && self.position.is_static()
            && self.scale.is_static()
            && self.rotation.is_static()
            && self.opacity.is_static()
            && self.skew.is_static()
            && self.skew_axis.is_static()
    }
}
