use crate::foundation::error::{LottieError, LottieResult};
use crate::foundation::math::mul_div255_u8;

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Output canvas (or composition) dimensions in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a canvas, rejecting zero-sized dimensions.
    pub fn new(width: u32, height: u32) -> LottieResult<Self> {
        if width == 0 || height == 0 {
            return Err(LottieError::validation("canvas width and height must be > 0"));
        }
        Ok(Self { width, height })
    }

    /// Full-canvas integer rectangle anchored at the origin.
    pub fn rect(self) -> IRect {
        IRect::new(0, 0, self.width as i32, self.height as i32)
    }
}

/// Integer pixel rectangle `[x, x + w) x [y, y + h)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct IRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width, never negative for a valid rect.
    pub w: i32,
    /// Height, never negative for a valid rect.
    pub h: i32,
}

impl IRect {
    /// Create a rect from origin and size.
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Exclusive right edge.
    pub fn right(self) -> i32 {
        self.x + self.w
    }

    /// Exclusive bottom edge.
    pub fn bottom(self) -> i32 {
        self.y + self.h
    }

    /// Return `true` when the rect covers no pixel.
    pub fn is_empty(self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Intersection of two rects (empty when disjoint).
    pub fn intersect(self, other: IRect) -> IRect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        IRect::new(x0, y0, (x1 - x0).max(0), (y1 - y0).max(0))
    }

    /// Smallest rect containing both.
    pub fn union(self, other: IRect) -> IRect {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        IRect::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Return `true` when the rects share at least one pixel.
    pub fn intersects(self, other: IRect) -> bool {
        !self.intersect(other).is_empty()
    }

    /// Return `true` when `(x, y)` lies inside the rect.
    pub fn contains(self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Straight-alpha color with channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    /// Opaque white, the format's default paint color.
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    /// Opaque color from straight components.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Return this color with alpha scaled by `alpha`.
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: (self.a * alpha).clamp(0.0, 1.0),
            ..self
        }
    }

    /// Straight 8-bit RGBA components.
    pub fn to_rgba8(self) -> [u8; 4] {
        fn to_u8(v: f32) -> u8 {
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a)]
    }

    /// Premultiplied packed `0xAARRGGBB`.
    pub fn to_argb_premul(self) -> u32 {
        let [r, g, b, a] = self.to_rgba8();
        premultiply_argb(r, g, b, a)
    }
}

/// Pack straight RGBA8 into premultiplied `0xAARRGGBB`.
pub fn premultiply_argb(r: u8, g: u8, b: u8, a: u8) -> u32 {
    let a16 = u16::from(a);
    let r = mul_div255_u8(u16::from(r), a16);
    let g = mul_div255_u8(u16::from(g), a16);
    let b = mul_div255_u8(u16::from(b), a16);
    (u32::from(a) << 24) | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

/// Unpack premultiplied `0xAARRGGBB` into straight RGBA8.
pub fn unpremultiply_argb(px: u32) -> [u8; 4] {
    let a = (px >> 24) as u8;
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let un = |c: u32| -> u8 {
        let c = (c & 0xff) * 255;
        ((c + u32::from(a) / 2) / u32::from(a)).min(255) as u8
    };
    [un(px >> 16), un(px >> 8), un(px), a]
}

/// Float comparison used for dirty detection and degenerate-geometry checks.
pub fn fuzzy_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * a.abs().max(b.abs()).max(1.0)
}

/// Return `true` when `v` is close enough to zero to be treated as zero.
pub fn fuzzy_zero(v: f64) -> bool {
    v.abs() <= 1e-6
}

/// Component-wise fuzzy equality for affine matrices.
pub fn affine_fuzzy_eq(a: &Affine, b: &Affine) -> bool {
    a.as_coeffs()
        .iter()
        .zip(b.as_coeffs().iter())
        .all(|(x, y)| fuzzy_eq(*x, *y))
}

/// Uniform scale factor of a transform, measured along the diagonal.
pub fn affine_scale(m: &Affine) -> f64 {
    const SQRT_2: f64 = std::f64::consts::SQRT_2;
    let p1 = *m * Point::ORIGIN;
    let p2 = *m * Point::new(SQRT_2, SQRT_2);
    (p2 - p1).hypot() / 2.0
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
