use std::ops::{BitAnd, BitOr, BitXor, Sub};
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::foundation::core::IRect;
use crate::foundation::math::div_by_255;

/// Horizontal run of pixels sharing one coverage value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Span {
    /// First pixel column.
    pub x: i32,
    /// Scanline.
    pub y: i32,
    /// Number of pixels, always > 0 inside a [`VRle`].
    pub len: u32,
    /// Coverage in `[1, 255]` inside a [`VRle`].
    pub coverage: u8,
}

impl Span {
    /// Build a span.
    pub const fn new(x: i32, y: i32, len: u32, coverage: u8) -> Self {
        Self { x, y, len, coverage }
    }

    /// Exclusive end column.
    pub fn end(&self) -> i32 {
        self.x + self.len as i32
    }
}

#[derive(Clone, Debug, Default)]
struct RleData {
    spans: Vec<Span>,
    bbox: OnceCell<IRect>,
}

/// Copy-on-write antialiased coverage region.
///
/// Spans are sorted by `(y, x)`, never overlap on a row and never have zero
/// length or zero coverage.
#[derive(Clone, Debug, Default)]
pub struct VRle {
    d: Arc<RleData>,
}

impl PartialEq for VRle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.d, &other.d) || self.d.spans == other.d.spans
    }
}

impl Eq for VRle {}

impl VRle {
    /// Empty region.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from spans already sorted by `(y, x)` and non-overlapping.
    ///
    /// Zero-length and zero-coverage spans are dropped; touching spans of
    /// equal coverage are merged.
    pub fn from_spans(spans: impl IntoIterator<Item = Span>) -> Self {
        let mut out = Vec::new();
        for s in spans {
            push_span(&mut out, s);
        }
        debug_assert!(is_normalized(&out), "spans must be sorted and disjoint");
        Self::from_vec(out)
    }

    fn from_vec(spans: Vec<Span>) -> Self {
        Self {
            d: Arc::new(RleData {
                spans,
                bbox: OnceCell::new(),
            }),
        }
    }

    /// Fully covered rectangle.
    pub fn from_rect(rect: IRect) -> Self {
        if rect.is_empty() {
            return Self::new();
        }
        Self::from_vec(
            (rect.y..rect.bottom())
                .map(|y| Span::new(rect.x, y, rect.w as u32, 255))
                .collect(),
        )
    }

    /// Return `true` when no pixel is covered.
    pub fn is_empty(&self) -> bool {
        self.d.spans.is_empty()
    }

    /// Spans in `(y, x)` order.
    pub fn spans(&self) -> &[Span] {
        &self.d.spans
    }

    /// Return `true` when both handles share one buffer.
    pub fn shares_buffer_with(&self, other: &VRle) -> bool {
        Arc::ptr_eq(&self.d, &other.d)
    }

    /// Smallest rect containing every span, computed once.
    pub fn bounding_rect(&self) -> IRect {
        *self.d.bbox.get_or_init(|| {
            let spans = &self.d.spans;
            let (Some(first), Some(last)) = (spans.first(), spans.last()) else {
                return IRect::default();
            };
            let x0 = spans.iter().map(|s| s.x).min().unwrap_or(first.x);
            let x1 = spans.iter().map(Span::end).max().unwrap_or(first.end());
            IRect::new(x0, first.y, x1 - x0, last.y - first.y + 1)
        })
    }

    /// Shift every span in place.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        if self.is_empty() || (dx == 0 && dy == 0) {
            return;
        }
        let d = Arc::make_mut(&mut self.d);
        for s in &mut d.spans {
            s.x += dx;
            s.y += dy;
        }
        d.bbox = OnceCell::new();
    }

    /// Scale every coverage by `alpha / 255`.
    pub fn mul_alpha(&self, alpha: u8) -> VRle {
        match alpha {
            255 => self.clone(),
            0 => VRle::new(),
            a => self.map_coverage(|c| div_by_255(u32::from(c) * u32::from(a))),
        }
    }

    /// Flip every span's coverage to `255 - coverage`.
    ///
    /// Fully covered spans disappear; uncovered pixels stay uncovered.
    pub fn invert(&self) -> VRle {
        self.map_coverage(|c| 255 - c)
    }

    fn map_coverage(&self, f: impl Fn(u8) -> u8) -> VRle {
        VRle::from_spans(self.d.spans.iter().map(|s| Span {
            coverage: f(s.coverage),
            ..*s
        }))
    }

    /// Clip to a rectangle.
    pub fn intersect_rect(&self, rect: IRect) -> VRle {
        if rect.is_empty() || self.is_empty() {
            return VRle::new();
        }
        let bbox = self.bounding_rect();
        if rect.intersect(bbox) == bbox {
            return self.clone();
        }
        VRle::from_spans(self.d.spans.iter().filter_map(|s| {
            if s.y < rect.y || s.y >= rect.bottom() {
                return None;
            }
            let x0 = s.x.max(rect.x);
            let x1 = s.end().min(rect.right());
            (x1 > x0).then(|| Span::new(x0, s.y, (x1 - x0) as u32, s.coverage))
        }))
    }

    /// Pixels covered by both, coverages multiplied.
    pub fn intersect(&self, other: &VRle) -> VRle {
        if self.is_empty() || other.is_empty() {
            return VRle::new();
        }
        if !self.bounding_rect().intersects(other.bounding_rect()) {
            return VRle::new();
        }
        let mut out = Vec::new();
        let mut ra = rows(self.spans()).peekable();
        let mut rb = rows(other.spans()).peekable();
        while let (Some(a), Some(b)) = (ra.peek(), rb.peek()) {
            match a[0].y.cmp(&b[0].y) {
                std::cmp::Ordering::Less => {
                    ra.next();
                }
                std::cmp::Ordering::Greater => {
                    rb.next();
                }
                std::cmp::Ordering::Equal => {
                    intersect_row(a, b, &mut out);
                    ra.next();
                    rb.next();
                }
            }
        }
        VRle::from_vec(out)
    }

    /// Pixels covered by either, coverages combined as `a + b - ab`.
    pub fn union(&self, other: &VRle) -> VRle {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        combine(self, other, |a, b| {
            let (a, b) = (u32::from(a), u32::from(b));
            (a + b).saturating_sub(u32::from(div_by_255(a * b))).min(255) as u8
        })
    }

    /// Coverage of `self` reduced by `other`, saturating at zero.
    pub fn subtract(&self, other: &VRle) -> VRle {
        if self.is_empty() || other.is_empty() {
            return self.clone();
        }
        combine(self, other, |a, b| a.saturating_sub(b))
    }

    /// Symmetric difference, coverages combined as `a + b - 2ab`.
    pub fn xor(&self, other: &VRle) -> VRle {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        combine(self, other, |a, b| {
            let (a, b) = (u32::from(a), u32::from(b));
            (a + b).saturating_sub(2 * u32::from(div_by_255(a * b))).min(255) as u8
        })
    }
}

impl BitAnd for &VRle {
    type Output = VRle;

    fn bitand(self, rhs: &VRle) -> VRle {
        self.intersect(rhs)
    }
}

impl BitOr for &VRle {
    type Output = VRle;

    fn bitor(self, rhs: &VRle) -> VRle {
        self.union(rhs)
    }
}

impl Sub for &VRle {
    type Output = VRle;

    fn sub(self, rhs: &VRle) -> VRle {
        self.subtract(rhs)
    }
}

impl BitXor for &VRle {
    type Output = VRle;

    fn bitxor(self, rhs: &VRle) -> VRle {
        self.xor(rhs)
    }
}

fn rows(spans: &[Span]) -> impl Iterator<Item = &[Span]> {
    spans.chunk_by(|a, b| a.y == b.y)
}

// Append keeping the invariants: no empty spans, touching equal runs merged.
pub(crate) fn push_span(out: &mut Vec<Span>, s: Span) {
    if s.len == 0 || s.coverage == 0 {
        return;
    }
    if let Some(last) = out.last_mut()
        && last.y == s.y
        && last.end() == s.x
        && last.coverage == s.coverage
    {
        last.len += s.len;
        return;
    }
    out.push(s);
}

fn is_normalized(spans: &[Span]) -> bool {
    spans
        .windows(2)
        .all(|w| w[0].y < w[1].y || (w[0].y == w[1].y && w[0].end() <= w[1].x))
}

fn intersect_row(a: &[Span], b: &[Span], out: &mut Vec<Span>) {
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let (sa, sb) = (a[i], b[j]);
        let x0 = sa.x.max(sb.x);
        let x1 = sa.end().min(sb.end());
        if x1 > x0 {
            // Overlapping coverage never rounds away entirely.
            let cov = div_by_255(u32::from(sa.coverage) * u32::from(sb.coverage)).max(1);
            push_span(out, Span::new(x0, sa.y, (x1 - x0) as u32, cov));
        }
        if sa.end() < sb.end() {
            i += 1;
        } else {
            j += 1;
        }
    }
}

// Per-row merge. Rows present on one side only are mapped span by span;
// shared rows are expanded into coverage buffers and re-encoded.
fn combine(a: &VRle, b: &VRle, op: impl Fn(u8, u8) -> u8) -> VRle {
    let mut out = Vec::with_capacity(a.spans().len() + b.spans().len());
    let mut buf_a = Vec::new();
    let mut buf_b = Vec::new();
    let mut ra = rows(a.spans()).peekable();
    let mut rb = rows(b.spans()).peekable();

    let single = |row: &[Span], out: &mut Vec<Span>, f: &dyn Fn(u8) -> u8| {
        for s in row {
            push_span(out, Span {
                coverage: f(s.coverage),
                ..*s
            });
        }
    };

    loop {
        match (ra.peek(), rb.peek()) {
            (None, None) => break,
            (Some(x), None) => {
                single(x, &mut out, &|c| op(c, 0));
                ra.next();
            }
            (None, Some(y)) => {
                single(y, &mut out, &|c| op(0, c));
                rb.next();
            }
            (Some(x), Some(y)) => {
                if x[0].y < y[0].y {
                    single(x, &mut out, &|c| op(c, 0));
                    ra.next();
                } else if y[0].y < x[0].y {
                    single(y, &mut out, &|c| op(0, c));
                    rb.next();
                } else {
                    blend_row(x, y, &op, &mut buf_a, &mut buf_b, &mut out);
                    ra.next();
                    rb.next();
                }
            }
        }
    }
    VRle::from_vec(out)
}

fn blend_row(
    a: &[Span],
    b: &[Span],
    op: &impl Fn(u8, u8) -> u8,
    buf_a: &mut Vec<u8>,
    buf_b: &mut Vec<u8>,
    out: &mut Vec<Span>,
) {
    let y = a[0].y;
    let x0 = a[0].x.min(b[0].x);
    let x1 = a[a.len() - 1].end().max(b[b.len() - 1].end());
    let width = (x1 - x0) as usize;

    for (buf, row) in [(&mut *buf_a, a), (&mut *buf_b, b)] {
        buf.clear();
        buf.resize(width, 0);
        for s in row {
            let start = (s.x - x0) as usize;
            buf[start..start + s.len as usize].fill(s.coverage);
        }
    }

    let mut run_start = 0usize;
    let mut run_cov = op(buf_a[0], buf_b[0]);
    for i in 1..width {
        let c = op(buf_a[i], buf_b[i]);
        if c != run_cov {
            push_span(out, Span::new(x0 + run_start as i32, y, (i - run_start) as u32, run_cov));
            run_start = i;
            run_cov = c;
        }
    }
    push_span(out, Span::new(x0 + run_start as i32, y, (width - run_start) as u32, run_cov));
}

#[cfg(test)]
#[path = "../../tests/unit/raster/rle.rs"]
mod tests;
