use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::foundation::core::{Affine, Color, Point, premultiply_argb};
use crate::foundation::error::{LottieError, LottieResult};

/// Entries in a gradient color table.
pub const COLOR_TABLE_SIZE: usize = 1024;
const GRADIENT_CACHE_LIMIT: usize = 60;

/// How a gradient continues outside `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Spread {
    /// Clamp to the end colors.
    #[default]
    Pad,
    /// Restart from the first color.
    Repeat,
    /// Mirror back and forth.
    Reflect,
}

/// One color stop; `offset` in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GradientStop {
    /// Position along the gradient.
    pub offset: f32,
    /// Straight-alpha color.
    pub color: Color,
}

/// Gradient geometry in the gradient's own space.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum GradientKind {
    /// Color varies along `start -> end`.
    Linear {
        /// Point at offset 0.
        start: Point,
        /// Point at offset 1.
        end: Point,
    },
    /// Color varies from `focal` outwards to the circle `(center, radius)`.
    Radial {
        /// Outer circle center.
        center: Point,
        /// Outer circle radius.
        radius: f64,
        /// Point at offset 0.
        focal: Point,
    },
}

/// Linear or radial gradient paint.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Gradient {
    /// Geometry.
    pub kind: GradientKind,
    /// Stops sorted by offset.
    pub stops: Vec<GradientStop>,
    /// Behaviour outside the stop range.
    pub spread: Spread,
    /// Extra opacity applied to every stop.
    pub alpha: f32,
    /// Gradient space to device space.
    pub transform: Affine,
}

/// Premultiplied ARGB image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Bitmap {
    /// Wrap premultiplied `0xAARRGGBB` pixels, row-major without padding.
    pub fn new(width: u32, height: u32, pixels: Vec<u32>) -> LottieResult<Self> {
        if pixels.len() != width as usize * height as usize {
            return Err(LottieError::validation(format!(
                "bitmap {width}x{height} needs {} pixels, got {}",
                width as usize * height as usize,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Convert straight RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, rgba: &[u8]) -> LottieResult<Self> {
        if rgba.len() != width as usize * height as usize * 4 {
            return Err(LottieError::validation("rgba8 buffer does not match bitmap size"));
        }
        let pixels = rgba
            .chunks_exact(4)
            .map(|p| premultiply_argb(p[0], p[1], p[2], p[3]))
            .collect();
        Self::new(width, height, pixels)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixels, row-major.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub(crate) fn get(&self, x: i64, y: i64) -> u32 {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return 0;
        }
        self.pixels[y as usize * self.width as usize + x as usize]
    }
}

/// Image paint.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    /// Source image.
    pub image: Arc<Bitmap>,
    /// Image space to device space.
    pub transform: Affine,
    /// Opacity in `[0, 255]`.
    pub alpha: u8,
}

/// What a drawable is painted with.
#[derive(Clone, Debug, PartialEq)]
pub enum Brush {
    /// Single color.
    Solid(Color),
    /// Linear or radial gradient.
    Gradient(Gradient),
    /// Transformed image.
    Texture(Texture),
}

impl Default for Brush {
    fn default() -> Self {
        Brush::Solid(Color {
            a: 0.0,
            ..Color::WHITE
        })
    }
}

impl Brush {
    /// Return `true` when painting with this brush cannot change a pixel.
    pub fn is_transparent(&self) -> bool {
        match self {
            Brush::Solid(c) => c.a <= 0.0,
            Brush::Gradient(g) => g.alpha <= 0.0 || g.stops.is_empty(),
            Brush::Texture(t) => t.alpha == 0,
        }
    }
}

/// Precomputed premultiplied colors for one gradient.
#[derive(Debug)]
pub struct ColorTable {
    colors: Vec<u32>,
}

impl ColorTable {
    fn build(stops: &[GradientStop], alpha: f32) -> Self {
        let mut colors = Vec::with_capacity(COLOR_TABLE_SIZE);
        let alpha = alpha.clamp(0.0, 1.0);
        let mut k = 0usize;
        for i in 0..COLOR_TABLE_SIZE {
            let pos = i as f32 / (COLOR_TABLE_SIZE - 1) as f32;
            while k + 1 < stops.len() && stops[k + 1].offset < pos {
                k += 1;
            }
            let c = match (stops.get(k), stops.get(k + 1)) {
                (None, _) => Color {
                    a: 0.0,
                    ..Color::WHITE
                },
                (Some(a), _) if pos <= a.offset => a.color,
                (Some(a), None) => a.color,
                (Some(a), Some(b)) => {
                    let span = b.offset - a.offset;
                    let t = if span <= f32::EPSILON {
                        1.0
                    } else {
                        ((pos - a.offset) / span).clamp(0.0, 1.0)
                    };
                    Color {
                        r: a.color.r + (b.color.r - a.color.r) * t,
                        g: a.color.g + (b.color.g - a.color.g) * t,
                        b: a.color.b + (b.color.b - a.color.b) * t,
                        a: a.color.a + (b.color.a - a.color.a) * t,
                    }
                }
            };
            colors.push(c.with_alpha(alpha).to_argb_premul());
        }
        Self { colors }
    }

    /// Color at a table index.
    pub fn at(&self, index: usize) -> u32 {
        self.colors[index.min(COLOR_TABLE_SIZE - 1)]
    }

    /// Color at gradient parameter `t` after applying `spread`.
    pub fn sample(&self, t: f64, spread: Spread) -> u32 {
        let t = if t.is_finite() { t } else { 0.0 };
        let t = match spread {
            Spread::Pad => t.clamp(0.0, 1.0),
            Spread::Repeat => t.rem_euclid(1.0),
            Spread::Reflect => {
                let m = t.rem_euclid(2.0);
                if m > 1.0 { 2.0 - m } else { m }
            }
        };
        self.at((t * (COLOR_TABLE_SIZE - 1) as f64 + 0.5) as usize)
    }
}

#[derive(Default)]
struct TableCache {
    tables: HashMap<Vec<u32>, Arc<ColorTable>>,
    order: VecDeque<Vec<u32>>,
}

fn table_key(stops: &[GradientStop], alpha: f32) -> Vec<u32> {
    let mut key = Vec::with_capacity(stops.len() * 5 + 1);
    key.push(alpha.to_bits());
    for s in stops {
        key.extend([
            s.offset.to_bits(),
            s.color.r.to_bits(),
            s.color.g.to_bits(),
            s.color.b.to_bits(),
            s.color.a.to_bits(),
        ]);
    }
    key
}

/// Shared color table for `stops` under `alpha`, built at most once while cached.
pub fn color_table(stops: &[GradientStop], alpha: f32) -> Arc<ColorTable> {
    static CACHE: Lazy<Mutex<TableCache>> = Lazy::new(|| Mutex::new(TableCache::default()));

    let key = table_key(stops, alpha);
    if let Some(t) = CACHE.lock().tables.get(&key) {
        return Arc::clone(t);
    }

    let table = Arc::new(ColorTable::build(stops, alpha));
    let mut cache = CACHE.lock();
    if cache.tables.len() >= GRADIENT_CACHE_LIMIT
        && let Some(oldest) = cache.order.pop_front()
    {
        cache.tables.remove(&oldest);
    }
    if cache.tables.insert(key.clone(), Arc::clone(&table)).is_none() {
        cache.order.push_back(key);
    }
    table
}

impl Gradient {
    /// Gradient parameter at a device-space point, given the inverse transform.
    pub(crate) fn parameter(&self, inverse: &Affine, device: Point) -> f64 {
        let p = *inverse * device;
        match self.kind {
            GradientKind::Linear { start, end } => {
                let d = end - start;
                let len2 = d.hypot2();
                if len2 <= f64::EPSILON {
                    return 0.0;
                }
                (p - start).dot(d) / len2
            }
            GradientKind::Radial {
                center,
                radius,
                focal,
            } => {
                if radius <= f64::EPSILON {
                    return 1.0;
                }
                let d = p - focal;
                let cd = center - focal;
                let a = cd.hypot2() - radius * radius;
                let b = d.dot(cd);
                let c = d.hypot2();
                if a.abs() <= f64::EPSILON {
                    if b.abs() <= f64::EPSILON {
                        return 0.0;
                    }
                    return c / (2.0 * b);
                }
                let disc = (b * b - a * c).max(0.0);
                (b - disc.sqrt()) / a
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paint/brush.rs"]
mod tests;
