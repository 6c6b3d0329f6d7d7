//! Lottie (Bodymovin) animation renderer.
//!
//! Documents are parsed into a shared, immutable [`Composition`]; each
//! [`Animation`] evaluates it frame by frame into a layered vector scene and
//! rasterizes that scene into a premultiplied ARGB [`Surface`], either on the
//! calling thread or on a work-stealing [`RenderScheduler`].

#![forbid(unsafe_code)]

pub mod animation;
mod foundation;
pub mod geometry;
pub mod loader;
pub mod model;
pub mod paint;
pub mod raster;
pub mod render;
pub mod scene;

pub use animation::{Animation, AnimationOpts};
pub use foundation::core::{Affine, Canvas, Color, IRect, Point, Rect, Vec2};
pub use foundation::error::{LottieError, LottieResult};
pub use loader::{DefaultImageLoader, ImageLoader, LoadOpts, ModelCache};
pub use model::{Composition, Marker};
pub use paint::{Bitmap, Surface};
pub use render::{RenderFuture, RenderScheduler, SchedulerOpts};
pub use scene::{
    BrushNode, KeyPath, LayerNode, MaskNode, PathData, PropertyKind, PropertyValue, RenderTree,
    ShapeNode, StrokeNode,
};
