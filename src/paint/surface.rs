use crate::foundation::core::{IRect, unpremultiply_argb};
use crate::foundation::error::{LottieError, LottieResult};

/// Caller-owned premultiplied ARGB32 pixel buffer.
///
/// Pixels are `0xAARRGGBB`, rows are `stride` pixels apart. Drawing is limited
/// to the draw region, the whole surface by default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    buffer: Vec<u32>,
    width: u32,
    height: u32,
    stride: u32,
    draw_region: IRect,
}

impl Surface {
    /// Wrap `buffer`; it must hold at least `stride * height` pixels.
    pub fn new(buffer: Vec<u32>, width: u32, height: u32, stride: u32) -> LottieResult<Self> {
        if stride < width {
            return Err(LottieError::validation(format!(
                "surface stride {stride} is smaller than width {width}"
            )));
        }
        let needed = stride as usize * height as usize;
        if buffer.len() < needed {
            return Err(LottieError::validation(format!(
                "surface buffer holds {} pixels, {needed} required",
                buffer.len()
            )));
        }
        Ok(Self {
            buffer,
            width,
            height,
            stride,
            draw_region: IRect::new(0, 0, width as i32, height as i32),
        })
    }

    /// Transparent surface with a tight stride.
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            buffer: vec![0; width as usize * height as usize],
            width,
            height,
            stride: width,
            draw_region: IRect::new(0, 0, width as i32, height as i32),
        }
    }

    /// Restrict drawing to `region`, clipped to the surface.
    pub fn with_draw_region(mut self, region: IRect) -> Self {
        self.draw_region = region.intersect(self.full_rect());
        self
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row pitch in pixels.
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Region drawing is limited to.
    pub fn draw_region(&self) -> IRect {
        self.draw_region
    }

    pub(crate) fn full_rect(&self) -> IRect {
        IRect::new(0, 0, self.width as i32, self.height as i32)
    }

    /// Return `true` when nothing can be drawn.
    pub fn is_empty(&self) -> bool {
        self.draw_region.is_empty()
    }

    /// Raw buffer including stride padding.
    pub fn pixels(&self) -> &[u32] {
        &self.buffer
    }

    /// Pixel at `(x, y)`, transparent outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.buffer[(y * self.stride + x) as usize]
    }

    /// Hand the buffer back to the caller.
    pub fn into_buffer(self) -> Vec<u32> {
        self.buffer
    }

    pub(crate) fn row(&self, y: i32) -> &[u32] {
        let start = y as usize * self.stride as usize;
        &self.buffer[start..start + self.width as usize]
    }

    pub(crate) fn row_mut(&mut self, y: i32) -> &mut [u32] {
        let start = y as usize * self.stride as usize;
        &mut self.buffer[start..start + self.width as usize]
    }

    /// Zero every pixel of the draw region.
    pub fn clear(&mut self) {
        let r = self.draw_region;
        for y in r.y..r.bottom() {
            self.row_mut(y)[r.x as usize..r.right() as usize].fill(0);
        }
    }

    /// Straight-alpha RGBA8 copy without stride padding, for image export.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for y in 0..self.height as i32 {
            for px in self.row(y) {
                out.extend_from_slice(&unpremultiply_argb(*px));
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paint/surface.rs"]
mod tests;
