use crate::geometry::path::VPath;

const STROKE_TOLERANCE: f64 = 0.05;

/// Shape drawn at open subpath ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CapStyle {
    /// Ends exactly at the endpoint.
    #[default]
    Flat,
    /// Half-disc around the endpoint.
    Round,
    /// Half-square extending past the endpoint.
    Square,
}

/// Shape drawn where two segments meet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum JoinStyle {
    /// Sharp corner, bevelled once it exceeds the miter limit.
    #[default]
    Miter,
    /// Circular arc.
    Round,
    /// Straight cut.
    Bevel,
}

/// Stroke geometry parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StrokeStyle {
    /// Full stroke width in path units.
    pub width: f64,
    /// End cap.
    pub cap: CapStyle,
    /// Corner join.
    pub join: JoinStyle,
    /// Miter length limit as a multiple of half the width.
    pub miter_limit: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            cap: CapStyle::Flat,
            join: JoinStyle::Miter,
            miter_limit: 4.0,
        }
    }
}

impl StrokeStyle {
    fn to_kurbo(self) -> kurbo::Stroke {
        let cap = match self.cap {
            CapStyle::Flat => kurbo::Cap::Butt,
            CapStyle::Round => kurbo::Cap::Round,
            CapStyle::Square => kurbo::Cap::Square,
        };
        let join = match self.join {
            JoinStyle::Miter => kurbo::Join::Miter,
            JoinStyle::Round => kurbo::Join::Round,
            JoinStyle::Bevel => kurbo::Join::Bevel,
        };
        kurbo::Stroke::new(self.width)
            .with_caps(cap)
            .with_join(join)
            .with_miter_limit(self.miter_limit.max(1.0))
    }
}

/// Expand `path` into a closed outline that, filled with the nonzero rule,
/// covers the stroke.
pub fn stroke_outline(path: &VPath, style: &StrokeStyle) -> VPath {
    if path.is_empty() || !style.width.is_finite() || style.width <= 0.0 {
        return VPath::new();
    }
    let outline = kurbo::stroke(
        path.to_bez_path(),
        &style.to_kurbo(),
        &kurbo::StrokeOpts::default(),
        STROKE_TOLERANCE,
    );
    VPath::from_bez_path(&outline)
}
