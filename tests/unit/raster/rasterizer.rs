use super::*;
use crate::foundation::core::Rect;
use crate::geometry::Direction;

fn rect_path(x0: f64, y0: f64, x1: f64, y1: f64) -> VPath {
    let mut p = VPath::new();
    p.add_rect(Rect::new(x0, y0, x1, y1), Direction::Cw);
    p
}

fn coverage_at(rle: &VRle, x: i32, y: i32) -> u8 {
    rle.spans()
        .iter()
        .find(|s| s.y == y && x >= s.x && x < s.end())
        .map_or(0, |s| s.coverage)
}

fn total_coverage(rle: &VRle) -> f64 {
    rle.spans()
        .iter()
        .map(|s| f64::from(s.len) * f64::from(s.coverage) / 255.0)
        .sum()
}

#[test]
fn pixel_aligned_rect_is_fully_covered() {
    let rle = fill_path(&rect_path(2.0, 2.0, 8.0, 8.0), FillRule::NonZero, None);
    assert_eq!(rle.bounding_rect(), IRect::new(2, 2, 6, 6));
    assert!(rle.spans().iter().all(|s| s.coverage == 255));
    assert_eq!(rle.spans().len(), 6);
}

#[test]
fn half_pixel_edges_get_half_coverage() {
    let rle = fill_path(&rect_path(0.5, 0.0, 2.5, 1.0), FillRule::NonZero, None);
    assert_eq!(coverage_at(&rle, 0, 0), 128);
    assert_eq!(coverage_at(&rle, 1, 0), 255);
    assert_eq!(coverage_at(&rle, 2, 0), 128);
}

#[test]
fn fill_rules_differ_on_nested_contours() {
    let mut p = rect_path(0.0, 0.0, 10.0, 10.0);
    p.add_path(&rect_path(2.0, 2.0, 8.0, 8.0));
    let nonzero = fill_path(&p, FillRule::NonZero, None);
    let evenodd = fill_path(&p, FillRule::EvenOdd, None);
    assert_eq!(coverage_at(&nonzero, 5, 5), 255);
    assert_eq!(coverage_at(&evenodd, 5, 5), 0);
    assert_eq!(coverage_at(&evenodd, 1, 5), 255);
}

#[test]
fn clip_limits_output_and_keeps_winding() {
    let clip = IRect::new(0, 0, 10, 10);
    let rle = fill_path(
        &rect_path(-50.0, -50.0, 150.0, 150.0),
        FillRule::NonZero,
        Some(clip),
    );
    assert_eq!(rle.bounding_rect(), clip);
    assert!((total_coverage(&rle) - 100.0).abs() < 1e-9);
}

#[test]
fn circle_area_matches_geometry() {
    let mut p = VPath::new();
    p.add_circle(Point::new(25.0, 25.0), 20.0, Direction::Cw);
    let rle = fill_path(&p, FillRule::NonZero, None);
    let expected = std::f64::consts::PI * 400.0;
    assert!((total_coverage(&rle) - expected).abs() / expected < 0.01);
    for w in rle.spans().windows(2) {
        assert!(w[0].y < w[1].y || w[0].end() <= w[1].x);
    }
}

#[test]
fn open_subpaths_are_closed_for_filling() {
    let mut open = VPath::new();
    open.move_to(Point::new(0.0, 0.0));
    open.line_to(Point::new(10.0, 0.0));
    open.line_to(Point::new(0.0, 10.0));
    let mut closed = open.clone();
    closed.close();
    assert_eq!(
        fill_path(&open, FillRule::NonZero, None),
        fill_path(&closed, FillRule::NonZero, None)
    );
}

#[test]
fn stroke_covers_band_around_line() {
    let mut p = VPath::new();
    p.move_to(Point::new(10.0, 10.0));
    p.line_to(Point::new(50.0, 10.0));
    let style = StrokeStyle {
        width: 2.0,
        ..StrokeStyle::default()
    };
    let rle = stroke_path(&p, &style, None);
    assert_eq!(rle.bounding_rect(), IRect::new(10, 9, 40, 2));
    assert!((total_coverage(&rle) - 80.0).abs() < 1e-9);
}

#[test]
fn empty_inputs_produce_empty_coverage() {
    assert!(fill_path(&VPath::new(), FillRule::NonZero, None).is_empty());
    let p = rect_path(0.0, 0.0, 10.0, 10.0);
    assert!(fill_path(&p, FillRule::NonZero, Some(IRect::new(20, 20, 5, 5))).is_empty());
    let mut r = Rasterizer::new();
    let a = r.fill(&p, FillRule::NonZero, None);
    let b = r.fill(&p, FillRule::NonZero, None);
    assert_eq!(a, b);
}
