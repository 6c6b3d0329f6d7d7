//! Coverage rasterization and run-length coverage algebra.

pub(crate) mod rasterizer;
pub(crate) mod rle;

pub use rasterizer::{FillRule, Rasterizer, fill_path, stroke_path};
pub use rle::{Span, VRle};
