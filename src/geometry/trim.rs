use crate::foundation::core::fuzzy_eq;
use crate::geometry::dasher::Dasher;
use crate::geometry::path::VPath;

/// Retained fraction of a path, both ends in `[0, 1]`.
///
/// `start > end` wraps: the kept region runs from `start` to the end of the
/// path and continues from its beginning up to `end`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrimSegment {
    /// Start fraction.
    pub start: f64,
    /// End fraction.
    pub end: f64,
}

impl Default for TrimSegment {
    fn default() -> Self {
        Self::FULL
    }
}

impl TrimSegment {
    /// Keeps the whole path.
    pub const FULL: TrimSegment = TrimSegment { start: 0.0, end: 1.0 };
    /// Keeps nothing.
    pub const EMPTY: TrimSegment = TrimSegment { start: 0.0, end: 0.0 };

    /// Build a segment directly from fractions.
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Resolve authored trim values: `start` and `end` in percent, `offset` in
    /// degrees (one full turn shifts the window by the whole path).
    pub fn from_percent(start: f64, end: f64, offset: f64) -> Self {
        let mut start = start / 100.0;
        let mut end = end / 100.0;
        let offset = (offset % 360.0) / 360.0;

        let diff = (start - end).abs();
        if fuzzy_eq(diff, 0.0) {
            return Self::EMPTY;
        }
        if fuzzy_eq(diff, 1.0) {
            return Self::FULL;
        }

        start += offset;
        end += offset;
        if offset > 0.0 {
            if start <= 1.0 && end <= 1.0 {
                Self::no_loop(start, end)
            } else if start > 1.0 && end > 1.0 {
                Self::no_loop(start - 1.0, end - 1.0)
            } else if start > 1.0 {
                Self::looped(start - 1.0, end)
            } else {
                Self::looped(start, end - 1.0)
            }
        } else if start >= 0.0 && end >= 0.0 {
            Self::no_loop(start, end)
        } else if start < 0.0 && end < 0.0 {
            Self::no_loop(1.0 + start, 1.0 + end)
        } else if start < 0.0 {
            Self::looped(1.0 + start, end)
        } else {
            Self::looped(start, 1.0 + end)
        }
    }

    fn no_loop(a: f64, b: f64) -> Self {
        Self::new(a.min(b), a.max(b))
    }

    fn looped(a: f64, b: f64) -> Self {
        Self::new(a.max(b), a.min(b))
    }

    /// Return `true` when the segment keeps nothing.
    pub fn is_empty(&self) -> bool {
        fuzzy_eq(self.start, self.end)
    }

    /// Return `true` when the segment keeps the whole path.
    pub fn is_full(&self) -> bool {
        (fuzzy_eq(self.start, 0.0) && fuzzy_eq(self.end, 1.0))
            || (fuzzy_eq(self.start, 1.0) && fuzzy_eq(self.end, 0.0))
    }

    /// Trim `path` to this segment of its total length.
    ///
    /// Subpaths are measured as one continuous run.
    pub fn trim(&self, path: &VPath) -> VPath {
        if self.is_empty() {
            return VPath::new();
        }
        if self.is_full() {
            return path.clone();
        }
        let length = path.length();
        let pattern = if self.start < self.end {
            [0.0, length * self.start, (self.end - self.start) * length, f64::MAX]
        } else {
            [
                length * self.end,
                (self.start - self.end) * length,
                (1.0 - self.start) * length,
                f64::MAX,
            ]
        };
        Dasher::new(&pattern).continuous(true).dashed(path)
    }
}

/// Trim a group of paths as if they were one path laid end to end.
///
/// Each path is kept, dropped or partially trimmed according to where its own
/// length falls inside the segment of the combined length.
pub fn trim_individually(paths: &[VPath], segment: TrimSegment) -> Vec<VPath> {
    if segment.is_empty() {
        return vec![VPath::new(); paths.len()];
    }
    if segment.is_full() {
        return paths.to_vec();
    }
    let lengths: Vec<f64> = paths.iter().map(VPath::length).collect();
    let total: f64 = lengths.iter().sum();
    if total <= 0.0 {
        return paths.to_vec();
    }

    let windows: Vec<(f64, f64)> = if segment.start < segment.end {
        vec![(segment.start * total, segment.end * total)]
    } else {
        vec![(segment.start * total, total), (0.0, segment.end * total)]
    };

    let mut out = Vec::with_capacity(paths.len());
    let mut cur = 0.0;
    for (path, &len) in paths.iter().zip(lengths.iter()) {
        let local = local_window(&windows, cur, len);
        out.push(match local {
            None => VPath::new(),
            Some(seg) if seg.is_full() => path.clone(),
            Some(seg) => seg.trim(path),
        });
        cur += len;
    }
    out
}

// Window of one path `[cur, cur + len]` expressed in its own `[0, 1]` range.
fn local_window(windows: &[(f64, f64)], cur: f64, len: f64) -> Option<TrimSegment> {
    if len <= 0.0 {
        return None;
    }
    let overlaps: Vec<(f64, f64)> = windows
        .iter()
        .filter_map(|&(s, e)| {
            let a = s.max(cur);
            let b = e.min(cur + len);
            (b > a).then(|| ((a - cur) / len, (b - cur) / len))
        })
        .collect();
    match overlaps.as_slice() {
        [] => None,
        [(a, b)] => Some(TrimSegment::new(*a, *b)),
        // Tail window first, head window second: a wrapped local trim.
        [(tail, _), (_, head), ..] => Some(TrimSegment::new(*tail, *head)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/trim.rs"]
mod tests;
