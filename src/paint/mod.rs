//! Brushes, the target surface and span compositing.

pub(crate) mod brush;
pub(crate) mod painter;
pub(crate) mod surface;

pub use brush::{
    Bitmap, Brush, COLOR_TABLE_SIZE, ColorTable, Gradient, GradientKind, GradientStop, Spread,
    Texture, color_table,
};
pub use painter::{CompositionMode, Painter, composite, luma_to_alpha};
pub use surface::Surface;
