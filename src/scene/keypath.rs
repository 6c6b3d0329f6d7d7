//! Keypath selection and property overrides.

use smallvec::SmallVec;

use crate::foundation::core::Color;
use crate::foundation::error::{LottieError, LottieResult};

/// Dot-separated name pattern selecting paint items.
///
/// Each segment matches one level of the name chain from the top-level layer
/// down to the paint item. `*` matches exactly one level, `**` any number of
/// levels including none.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPath {
    raw: String,
    segments: SmallVec<[String; 4]>,
}

impl KeyPath {
    /// Parse `a.b.*.c`. Empty paths and empty segments are rejected.
    pub fn parse(keypath: &str) -> LottieResult<Self> {
        if keypath.is_empty() {
            return Err(LottieError::validation("keypath must not be empty"));
        }
        let segments: SmallVec<[String; 4]> = keypath.split('.').map(str::to_owned).collect();
        if segments.iter().any(String::is_empty) {
            return Err(LottieError::validation(format!(
                "keypath `{keypath}` has an empty segment"
            )));
        }
        Ok(Self {
            raw: keypath.to_owned(),
            segments,
        })
    }

    /// Source text.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Return `true` when the pattern selects the item at the end of `chain`.
    pub fn matches<S: AsRef<str>>(&self, chain: &[S]) -> bool {
        match_from(&self.segments, chain)
    }
}

fn match_from<S: AsRef<str>>(pattern: &[String], chain: &[S]) -> bool {
    match pattern.split_first() {
        None => chain.is_empty(),
        Some((head, rest)) if head == "**" => {
            (0..=chain.len()).any(|skip| match_from(rest, &chain[skip..]))
        }
        Some((head, rest)) => match chain.split_first() {
            Some((name, tail)) => (head == "*" || head == name.as_ref()) && match_from(rest, tail),
            None => false,
        },
    }
}

/// Property an override replaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    /// Solid fill color.
    FillColor,
    /// Fill opacity.
    FillOpacity,
    /// Solid stroke color.
    StrokeColor,
    /// Stroke opacity.
    StrokeOpacity,
    /// Stroke width.
    StrokeWidth,
}

/// Override value for one property kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PropertyValue {
    /// Straight RGB color; alpha is ignored.
    FillColor(Color),
    /// Opacity in percent.
    FillOpacity(f32),
    /// Straight RGB color; alpha is ignored.
    StrokeColor(Color),
    /// Opacity in percent.
    StrokeOpacity(f32),
    /// Width in layer units.
    StrokeWidth(f32),
}

impl PropertyValue {
    /// Which property this value replaces.
    pub fn kind(&self) -> PropertyKind {
        match self {
            Self::FillColor(_) => PropertyKind::FillColor,
            Self::FillOpacity(_) => PropertyKind::FillOpacity,
            Self::StrokeColor(_) => PropertyKind::StrokeColor,
            Self::StrokeOpacity(_) => PropertyKind::StrokeOpacity,
            Self::StrokeWidth(_) => PropertyKind::StrokeWidth,
        }
    }
}

/// Active overrides in the order they were set.
#[derive(Clone, Debug, Default)]
pub(crate) struct OverrideSet {
    entries: Vec<(KeyPath, PropertyValue)>,
}

impl OverrideSet {
    /// Add or replace the override for `(keypath, value.kind())`.
    pub(crate) fn set(&mut self, keypath: KeyPath, value: PropertyValue) {
        let kind = value.kind();
        self.entries
            .retain(|(k, v)| !(k.as_str() == keypath.as_str() && v.kind() == kind));
        self.entries.push((keypath, value));
    }

    /// Drop the override for `(keypath, kind)`; returns whether one existed.
    pub(crate) fn remove(&mut self, keypath: &KeyPath, kind: PropertyKind) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|(k, v)| !(k.as_str() == keypath.as_str() && v.kind() == kind));
        self.entries.len() != before
    }

    /// Effective overrides for a paint with the given name chain.
    pub(crate) fn resolve<S: AsRef<str>>(&self, chain: &[S], paint: PaintClass) -> PaintOverrides {
        let mut out = PaintOverrides::default();
        for (keypath, value) in &self.entries {
            if keypath.matches(chain) {
                out.apply(paint, *value);
            }
        }
        out
    }
}

/// Whether a paint covers the interior or the outline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PaintClass {
    Fill,
    Stroke,
}

/// Overrides resolved for one paint item.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct PaintOverrides {
    pub(crate) color: Option<Color>,
    /// Percent.
    pub(crate) opacity: Option<f32>,
    pub(crate) width: Option<f32>,
}

impl PaintOverrides {
    fn apply(&mut self, paint: PaintClass, value: PropertyValue) {
        match (paint, value) {
            (PaintClass::Fill, PropertyValue::FillColor(c)) | (PaintClass::Stroke, PropertyValue::StrokeColor(c)) => {
                self.color = Some(Color { a: 1.0, ..c });
            }
            (PaintClass::Fill, PropertyValue::FillOpacity(o)) | (PaintClass::Stroke, PropertyValue::StrokeOpacity(o)) => {
                self.opacity = Some(o);
            }
            (PaintClass::Stroke, PropertyValue::StrokeWidth(w)) => self.width = Some(w),
            _ => {}
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/keypath.rs"]
mod tests;
