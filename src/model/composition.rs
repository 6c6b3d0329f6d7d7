use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::model::animatable::Interpolator;
use crate::model::layer::Layer;
use crate::paint::Bitmap;

/// Named time range.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Marker {
    /// Marker comment.
    pub name: String,
    /// First frame.
    pub start_frame: f32,
    /// Last frame.
    pub end_frame: f32,
}

/// Where an image asset's bytes come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    /// Decoded `data:` URI payload.
    Embedded(Vec<u8>),
    /// File resolved against the resource directory.
    File(PathBuf),
}

/// Bitmap asset referenced by image layers.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageAsset {
    /// Asset id.
    pub id: String,
    /// Declared width.
    pub width: u32,
    /// Declared height.
    pub height: u32,
    /// Source bytes or file.
    pub source: ImageSource,
    /// Decoded pixels; `None` when decoding failed.
    pub bitmap: Option<Arc<Bitmap>>,
}

/// Shared asset.
#[derive(Clone, Debug, PartialEq)]
pub enum Asset {
    /// Layer list referenced by precomp layers.
    Precomp(Arc<Vec<Layer>>),
    /// Bitmap.
    Image(Arc<ImageAsset>),
}

/// Parsed, immutable animation document.
#[derive(Clone, Debug, PartialEq)]
pub struct Composition {
    /// Format version string.
    pub version: String,
    /// Document name.
    pub name: Option<String>,
    /// Frames per second.
    pub frame_rate: f32,
    /// First frame.
    pub start_frame: f32,
    /// End frame, exclusive.
    pub end_frame: f32,
    /// Canvas width.
    pub width: u32,
    /// Canvas height.
    pub height: u32,
    /// Root layers in document order.
    pub layers: Vec<Layer>,
    /// Assets by id.
    pub assets: HashMap<String, Asset>,
    /// Named time ranges.
    pub markers: Vec<Marker>,
    pub(crate) interpolators: Vec<Arc<Interpolator>>,
}

impl Composition {
    /// Number of frames.
    pub fn total_frame(&self) -> usize {
        (self.end_frame - self.start_frame).max(0.0).round() as usize
    }

    /// Length in seconds.
    pub fn duration(&self) -> f64 {
        f64::from(self.end_frame - self.start_frame).max(0.0) / f64::from(self.frame_rate)
    }

    /// Frame for a normalized position, clamped to `[0, 1]`.
    ///
    /// The out point is exclusive, so position 1 maps to the last drawable
    /// frame `end_frame - 1`.
    pub fn frame_at_pos(&self, pos: f64) -> usize {
        let pos = if pos.is_nan() { 0.0 } else { pos.clamp(0.0, 1.0) };
        let start = f64::from(self.start_frame);
        let span = (f64::from(self.end_frame) - start - 1.0).max(0.0);
        (start + pos * span).round().max(start).max(0.0) as usize
    }

    /// Number of distinct easing curves.
    pub fn interpolator_count(&self) -> usize {
        self.interpolators.len()
    }

    /// Return `true` when no layer in the document is animated.
    pub fn is_static(&self) -> bool {
        self.layers.iter().all(Layer::is_static)
    }
}
