pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Fast `x / 255` for `x` in `[0, 255 * 255]`, exact for products of two bytes.
#[inline]
pub(crate) fn div_by_255(x: u32) -> u8 {
    ((x + (x >> 8) + 0x80) >> 8) as u8
}

/// Multiply each channel of a packed ARGB pixel by `a` in `[0, 255]`.
#[inline]
pub(crate) fn byte_mul(px: u32, a: u32) -> u32 {
    let mut t = (px & 0x00ff_00ff) * a;
    t = (t + ((t >> 8) & 0x00ff_00ff) + 0x0080_0080) >> 8;
    t &= 0x00ff_00ff;

    let mut x = ((px >> 8) & 0x00ff_00ff) * a;
    x = x + ((x >> 8) & 0x00ff_00ff) + 0x0080_0080;
    x &= 0xff00_ff00;
    x | t
}

/// `x * a + y * b` per channel with `a`, `b` in `[0, 255]`.
#[inline]
pub(crate) fn interpolate_pixel(x: u32, a: u32, y: u32, b: u32) -> u32 {
    let mut t = (x & 0x00ff_00ff) * a + (y & 0x00ff_00ff) * b;
    t = (t + ((t >> 8) & 0x00ff_00ff) + 0x0080_0080) >> 8;
    t &= 0x00ff_00ff;

    let mut xx = ((x >> 8) & 0x00ff_00ff) * a + ((y >> 8) & 0x00ff_00ff) * b;
    xx = xx + ((xx >> 8) & 0x00ff_00ff) + 0x0080_0080;
    xx &= 0xff00_ff00;
    xx | t
}

/// Alpha of a packed ARGB pixel.
#[inline]
pub(crate) fn alpha(px: u32) -> u32 {
    px >> 24
}

/// Alpha of the inverted pixel (`255 - alpha`).
#[inline]
pub(crate) fn inv_alpha(px: u32) -> u32 {
    (!px) >> 24
}

/// Rec. 601 luma of a packed ARGB pixel, in `[0, 255]`.
#[inline]
pub(crate) fn luma(px: u32) -> u32 {
    let r = (px >> 16) & 0xff;
    let g = (px >> 8) & 0xff;
    let b = px & 0xff;
    (r * 77 + g * 151 + b * 28) >> 8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
