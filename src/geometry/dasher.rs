use crate::foundation::core::{Point, fuzzy_eq};
use crate::geometry::bezier::{Bezier, split_line_at_length};
use crate::geometry::path::{Segment, VPath};

const EPSILON: f64 = 1e-6;

#[derive(Clone, Copy, Debug)]
struct Dash {
    length: f64,
    gap: f64,
}

/// Rewrites a path to the "on" intervals of a dash pattern.
///
/// The pattern is `[dash, gap, dash, gap, ...]`; an odd trailing entry is the
/// phase offset.
#[derive(Clone, Debug)]
pub struct Dasher {
    dashes: Vec<Dash>,
    offset: f64,
    continuous: bool,
    index: usize,
    current_length: f64,
    discard: bool,
    start_new_segment: bool,
    cur: Point,
    result: VPath,
}

impl Dasher {
    /// Build a dasher from a flat dash array.
    pub fn new(pattern: &[f64]) -> Self {
        let dashes = pattern
            .chunks_exact(2)
            .map(|c| Dash {
                length: c[0].max(0.0),
                gap: c[1].max(0.0),
            })
            .collect();
        let offset = if pattern.len() % 2 == 1 {
            pattern[pattern.len() - 1]
        } else {
            0.0
        };
        Self {
            dashes,
            offset,
            continuous: false,
            index: 0,
            current_length: 0.0,
            discard: false,
            start_new_segment: true,
            cur: Point::ORIGIN,
            result: VPath::new(),
        }
    }

    /// Keep the pattern running across subpaths instead of restarting it at
    /// every move.
    pub fn continuous(mut self, continuous: bool) -> Self {
        self.continuous = continuous;
        self
    }

    fn pattern_length(&self) -> f64 {
        self.dashes.iter().map(|d| d.length + d.gap).sum()
    }

    /// Return the dashed copy of `path`.
    ///
    /// Empty and all-zero patterns return the input unchanged.
    pub fn dashed(mut self, path: &VPath) -> VPath {
        if self.dashes.is_empty() || self.pattern_length() <= EPSILON || path.is_empty() {
            return path.clone();
        }

        let mut start = Point::ORIGIN;
        let mut first_move = true;
        for seg in path.segments_iter() {
            match seg {
                Segment::Move(p) => {
                    start = p;
                    if first_move || !self.continuous {
                        self.reset_pattern();
                        first_move = false;
                    }
                    self.start_new_segment = true;
                    self.cur = p;
                }
                Segment::Line(_, p) => self.line_to(p),
                Segment::Cubic(b) => self.cubic_to(b),
                Segment::Close => {
                    if !(fuzzy_eq(self.cur.x, start.x) && fuzzy_eq(self.cur.y, start.y)) {
                        self.line_to(start);
                    }
                }
            }
        }
        self.result
    }

    fn reset_pattern(&mut self) {
        self.discard = false;
        self.index = 0;
        if self.offset != 0.0 {
            let total = self.pattern_length();
            let mut normalized = self.offset % total;
            if normalized < 0.0 {
                normalized += total;
            }
            self.current_length = self.dashes[0].length;
            for (i, d) in self.dashes.iter().enumerate() {
                if normalized < d.length {
                    self.index = i;
                    self.current_length = d.length - normalized;
                    self.discard = false;
                    break;
                }
                normalized -= d.length;
                if normalized < d.gap {
                    self.index = i;
                    self.current_length = d.gap - normalized;
                    self.discard = true;
                    break;
                }
                normalized -= d.gap;
            }
        } else {
            self.current_length = self.dashes[0].length;
        }
        if self.current_length <= EPSILON {
            self.advance();
        }
    }

    // Move to the next dash or gap, skipping zero-length entries.
    fn advance(&mut self) {
        for _ in 0..self.dashes.len() * 2 + 1 {
            self.start_new_segment = true;
            if self.discard {
                self.discard = false;
                self.index = (self.index + 1) % self.dashes.len();
                self.current_length = self.dashes[self.index].length;
            } else {
                self.discard = true;
                self.current_length = self.dashes[self.index].gap;
            }
            if self.current_length > EPSILON {
                return;
            }
        }
    }

    fn emit_line(&mut self, to: Point) {
        if self.discard {
            return;
        }
        if self.start_new_segment {
            self.result.move_to(self.cur);
            self.start_new_segment = false;
        }
        self.result.line_to(to);
    }

    fn emit_cubic(&mut self, b: &Bezier) {
        if self.discard {
            return;
        }
        if self.start_new_segment {
            self.result.move_to(b.p0);
            self.start_new_segment = false;
        }
        self.result.cubic_to(b.p1, b.p2, b.p3);
    }

    fn line_to(&mut self, p: Point) {
        let mut from = self.cur;
        let mut length = from.distance(p);
        while length > self.current_length {
            let split = split_line_at_length(from, p, self.current_length);
            length -= self.current_length;
            self.emit_line(split);
            self.advance();
            from = split;
            self.cur = split;
        }
        if length > EPSILON {
            self.current_length -= length;
            self.emit_line(p);
        }
        if self.current_length <= EPSILON {
            self.advance();
        }
        self.cur = p;
    }

    fn cubic_to(&mut self, b: Bezier) {
        let mut rest = b;
        let mut length = rest.length();
        while length > self.current_length {
            let (left, right) = rest.split_at_length(self.current_length);
            length -= self.current_length;
            self.emit_cubic(&left);
            self.advance();
            rest = right;
            self.cur = rest.p0;
        }
        if length > EPSILON {
            self.current_length -= length;
            self.emit_cubic(&rest);
        }
        if self.current_length <= EPSILON {
            self.advance();
        }
        self.cur = b.p3;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/dasher.rs"]
mod tests;
