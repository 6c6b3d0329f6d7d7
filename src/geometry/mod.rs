//! Path geometry: Bezier math, the copy-on-write path buffer, shape
//! constructors, dashing, trimming and stroke expansion.

pub(crate) mod bezier;
pub(crate) mod dasher;
pub(crate) mod path;
pub(crate) mod stroke;
pub(crate) mod trim;

pub use bezier::Bezier;
pub use dasher::Dasher;
pub use path::{Direction, PathElement, Segment, VPath};
pub use stroke::{CapStyle, JoinStyle, StrokeStyle, stroke_outline};
pub use trim::{TrimSegment, trim_individually};
