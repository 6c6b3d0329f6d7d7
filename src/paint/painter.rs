use crate::foundation::core::{Affine, Point};
use crate::foundation::math::{alpha, byte_mul, interpolate_pixel, inv_alpha, luma};
use crate::paint::brush::{Brush, color_table};
use crate::paint::surface::Surface;
use crate::raster::VRle;

/// Porter-Duff operator used when writing onto a surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CompositionMode {
    /// Source over destination.
    #[default]
    SrcOver,
    /// Destination kept where the source is opaque.
    DestIn,
    /// Destination kept where the source is transparent.
    DestOut,
}

/// Draws coverage regions onto a borrowed surface.
pub struct Painter<'a> {
    surface: &'a mut Surface,
    scratch: Vec<u32>,
}

impl<'a> Painter<'a> {
    /// Paint onto `surface` inside its draw region.
    pub fn new(surface: &'a mut Surface) -> Self {
        Self {
            surface,
            scratch: Vec::new(),
        }
    }

    /// Composite `brush` through `rle` with source-over.
    pub fn draw_rle(&mut self, rle: &VRle, brush: &Brush) {
        self.draw_rle_with(rle, brush, CompositionMode::SrcOver);
    }

    /// Composite `brush` through `rle ∩ clip`.
    pub fn draw_rle_clipped(&mut self, rle: &VRle, clip: &VRle, brush: &Brush) {
        self.draw_rle(&rle.intersect(clip), brush);
    }

    /// Composite `brush` through `rle` with `mode`.
    pub fn draw_rle_with(&mut self, rle: &VRle, brush: &Brush, mode: CompositionMode) {
        if rle.is_empty() || self.surface.is_empty() {
            return;
        }
        if mode == CompositionMode::SrcOver && brush.is_transparent() {
            return;
        }
        let rle = rle.intersect_rect(self.surface.draw_region());
        match brush {
            Brush::Solid(color) => {
                let src = color.to_argb_premul();
                for s in rle.spans() {
                    let row = self.surface.row_mut(s.y);
                    let dst = &mut row[s.x as usize..s.end() as usize];
                    blend_solid(dst, src, s.coverage, mode);
                }
            }
            Brush::Gradient(g) => {
                let Some(inverse) = invert(&g.transform) else {
                    return;
                };
                let table = color_table(&g.stops, g.alpha);
                for s in rle.spans() {
                    self.scratch.clear();
                    self.scratch.extend((s.x..s.end()).map(|x| {
                        let t = g.parameter(&inverse, pixel_center(x, s.y));
                        table.sample(t, g.spread)
                    }));
                    let row = self.surface.row_mut(s.y);
                    blend(&mut row[s.x as usize..s.end() as usize], &self.scratch, s.coverage, mode);
                }
            }
            Brush::Texture(tex) => {
                let Some(inverse) = invert(&tex.transform) else {
                    return;
                };
                for s in rle.spans() {
                    self.scratch.clear();
                    self.scratch.extend((s.x..s.end()).map(|x| {
                        let p = inverse * pixel_center(x, s.y);
                        let px = tex.image.get(p.x.floor() as i64, p.y.floor() as i64);
                        if tex.alpha == 255 {
                            px
                        } else {
                            byte_mul(px, u32::from(tex.alpha))
                        }
                    }));
                    let row = self.surface.row_mut(s.y);
                    blend(&mut row[s.x as usize..s.end() as usize], &self.scratch, s.coverage, mode);
                }
            }
        }
    }
}

/// Composite all of `src` onto `dst` inside `dst`'s draw region, scaling the
/// source by `opacity`.
pub fn composite(dst: &mut Surface, src: &Surface, mode: CompositionMode, opacity: u8) {
    let region = dst.draw_region().intersect(src.full_rect());
    if region.is_empty() {
        return;
    }
    let (x0, x1) = (region.x as usize, region.right() as usize);
    for y in region.y..region.bottom() {
        let src_row = &src.row(y)[x0..x1];
        blend(&mut dst.row_mut(y)[x0..x1], src_row, opacity, mode);
    }
}

/// Replace every pixel's alpha with its luma, for luminance mattes.
pub fn luma_to_alpha(surface: &mut Surface) {
    let region = surface.draw_region();
    for y in region.y..region.bottom() {
        for px in &mut surface.row_mut(y)[region.x as usize..region.right() as usize] {
            let l = luma(*px);
            *px = (l << 24) | (l << 16) | (l << 8) | l;
        }
    }
}

fn pixel_center(x: i32, y: i32) -> Point {
    Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5)
}

fn invert(m: &Affine) -> Option<Affine> {
    let det = m.determinant();
    (det.is_finite() && det.abs() > f64::EPSILON).then(|| m.inverse())
}

fn blend_solid(dst: &mut [u32], src: u32, coverage: u8, mode: CompositionMode) {
    let cov = u32::from(coverage);
    match mode {
        CompositionMode::SrcOver => {
            if alpha(src) == 255 && cov == 255 {
                dst.fill(src);
                return;
            }
            let s = if cov == 255 { src } else { byte_mul(src, cov) };
            let ia = inv_alpha(s);
            for d in dst {
                *d = s.wrapping_add(byte_mul(*d, ia));
            }
        }
        CompositionMode::DestIn | CompositionMode::DestOut => {
            let keep = if mode == CompositionMode::DestIn {
                alpha(src)
            } else {
                inv_alpha(src)
            };
            for d in dst {
                *d = dest_keep(*d, keep, cov);
            }
        }
    }
}

fn blend(dst: &mut [u32], src: &[u32], coverage: u8, mode: CompositionMode) {
    let cov = u32::from(coverage);
    match mode {
        CompositionMode::SrcOver => {
            for (d, &s) in dst.iter_mut().zip(src) {
                let s = if cov == 255 { s } else { byte_mul(s, cov) };
                *d = s.wrapping_add(byte_mul(*d, inv_alpha(s)));
            }
        }
        CompositionMode::DestIn => {
            for (d, &s) in dst.iter_mut().zip(src) {
                *d = dest_keep(*d, alpha(s), cov);
            }
        }
        CompositionMode::DestOut => {
            for (d, &s) in dst.iter_mut().zip(src) {
                *d = dest_keep(*d, inv_alpha(s), cov);
            }
        }
    }
}

// Destination scaled by `keep`, blended back towards itself outside coverage.
fn dest_keep(d: u32, keep: u32, cov: u32) -> u32 {
    let t = byte_mul(d, keep);
    if cov == 255 {
        t
    } else {
        interpolate_pixel(t, cov, d, 255 - cov)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paint/painter.rs"]
mod tests;
