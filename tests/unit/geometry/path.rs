use super::*;

fn unit_square() -> VPath {
    let mut p = VPath::new();
    p.add_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Direction::Cw);
    p
}

#[test]
fn rect_is_closed_four_sided_loop() {
    let p = unit_square();
    assert_eq!(
        p.elements(),
        &[
            PathElement::MoveTo,
            PathElement::LineTo,
            PathElement::LineTo,
            PathElement::LineTo,
            PathElement::LineTo,
            PathElement::Close
        ]
    );
    assert_eq!(p.segment_count(), 1);
    assert!((p.length() - 40.0).abs() < 1e-9);
}

#[test]
fn degenerate_shapes_are_noops() {
    let mut p = VPath::new();
    p.add_rect(Rect::new(5.0, 5.0, 5.0, 20.0), Direction::Cw);
    p.add_oval(Rect::new(0.0, 0.0, 0.0, 0.0), Direction::Cw);
    p.add_round_rect(Rect::new(1.0, 1.0, 1.0, 1.0), 3.0, 3.0, Direction::Ccw);
    p.add_polystar(0.0, 1.0, 2.0, 0.0, 0.0, 0.0, Point::ORIGIN, Direction::Cw);
    p.add_polygon(0.5, 10.0, 0.0, 0.0, Point::ORIGIN, Direction::Cw);
    assert!(p.is_empty());
}

#[test]
fn close_adds_line_back_to_start() {
    let mut p = VPath::new();
    p.move_to(Point::new(0.0, 0.0));
    p.line_to(Point::new(10.0, 0.0));
    p.line_to(Point::new(10.0, 10.0));
    p.close();
    assert_eq!(p.points().last(), Some(&Point::new(0.0, 0.0)));
    assert!((p.length() - (20.0 + 200f64.sqrt())).abs() < 1e-9);
}

#[test]
fn drawing_without_move_starts_at_origin() {
    let mut p = VPath::new();
    p.line_to(Point::new(3.0, 4.0));
    assert_eq!(p.elements()[0], PathElement::MoveTo);
    assert_eq!(p.points()[0], Point::ORIGIN);
    assert!((p.length() - 5.0).abs() < 1e-9);
}

#[test]
fn clone_is_copy_on_write() {
    let a = unit_square();
    let mut b = a.clone();
    assert!(a.shares_buffer_with(&b));
    b.transform(&Affine::translate((5.0, 0.0)));
    assert!(!a.shares_buffer_with(&b));
    assert_eq!(a.points()[0], Point::new(10.0, 0.0));
    assert_eq!(b.points()[0], Point::new(15.0, 0.0));
}

#[test]
fn oval_length_matches_circumference() {
    let mut p = VPath::new();
    p.add_circle(Point::new(50.0, 50.0), 40.0, Direction::Cw);
    let expected = 2.0 * std::f64::consts::PI * 40.0;
    assert!((p.length() - expected).abs() < 0.5);
    let r = p.bounding_rect();
    assert!((r.x0 - 10.0).abs() < 1e-9 && (r.x1 - 90.0).abs() < 1e-9);
}

#[test]
fn round_rect_corners_shorten_perimeter() {
    let mut p = VPath::new();
    p.add_round_rect(Rect::new(0.0, 0.0, 100.0, 100.0), 10.0, 10.0, Direction::Cw);
    let expected = 4.0 * 80.0 + 2.0 * std::f64::consts::PI * 10.0;
    assert!((p.length() - expected).abs() < 0.5);
}

#[test]
fn directions_produce_same_bounds() {
    let mut cw = VPath::new();
    cw.add_oval(Rect::new(0.0, 0.0, 20.0, 10.0), Direction::Cw);
    let mut ccw = VPath::new();
    ccw.add_oval(Rect::new(0.0, 0.0, 20.0, 10.0), Direction::Ccw);
    assert_eq!(cw.bounding_rect(), ccw.bounding_rect());
    assert_ne!(cw.points()[1], ccw.points()[1]);
}

#[test]
fn star_has_two_vertices_per_point() {
    let mut p = VPath::new();
    p.add_polystar(5.0, 20.0, 50.0, 0.0, 0.0, 0.0, Point::ORIGIN, Direction::Cw);
    let lines = p
        .elements()
        .iter()
        .filter(|e| **e == PathElement::LineTo)
        .count();
    assert!(lines >= 10);
    let top = p.points()[0];
    assert!(top.x.abs() < 1e-9 && (top.y + 50.0).abs() < 1e-9);
}

#[test]
fn polygon_vertices_sit_on_radius() {
    let mut p = VPath::new();
    p.add_polygon(6.0, 30.0, 0.0, 0.0, Point::new(100.0, 100.0), Direction::Cw);
    for pt in p.points() {
        let d = pt.distance(Point::new(100.0, 100.0));
        assert!((d - 30.0).abs() < 1e-6);
    }
}

#[test]
fn bez_path_conversion_preserves_geometry() {
    let mut p = VPath::new();
    p.add_circle(Point::new(0.0, 0.0), 10.0, Direction::Cw);
    let back = VPath::from_bez_path(&p.to_bez_path());
    assert!((back.length() - p.length()).abs() < 1e-6);
}

#[test]
fn arc_zero_sweep_only_moves() {
    let mut p = VPath::new();
    p.arc_to(Rect::new(0.0, 0.0, 10.0, 10.0), 0.0, 0.0, true);
    assert_eq!(p.elements(), &[PathElement::MoveTo]);
    assert_eq!(p.points()[0], Point::new(10.0, 5.0));
}
