use super::*;

fn straight() -> Bezier {
    Bezier::new(
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(20.0, 0.0),
        Point::new(30.0, 0.0),
    )
}

fn quarter_circle(r: f64) -> Bezier {
    const KAPPA: f64 = 0.5522847498;
    Bezier::new(
        Point::new(r, 0.0),
        Point::new(r, r * KAPPA),
        Point::new(r * KAPPA, r),
        Point::new(0.0, r),
    )
}

#[test]
fn straight_segment_length_is_exact() {
    assert!((straight().length() - 30.0).abs() < 1e-9);
}

#[test]
fn quarter_circle_length_is_close_to_arc() {
    let r = 100.0;
    let expected = std::f64::consts::FRAC_PI_2 * r;
    assert!((quarter_circle(r).length() - expected).abs() < 0.1);
}

#[test]
fn split_halves_share_midpoint() {
    let b = quarter_circle(10.0);
    let (l, r) = b.split(0.5);
    assert_eq!(l.p3, r.p0);
    assert!((l.p3 - b.point_at(0.5)).hypot() < 1e-9);
    assert!((l.length() + r.length() - b.length()).abs() < 0.05);
}

#[test]
fn split_at_length_lands_on_requested_length() {
    let b = quarter_circle(50.0);
    let (l, _) = b.split_at_length(30.0);
    assert!((l.length() - 30.0).abs() < 0.05);
    assert_eq!(b.t_at_length(-1.0, b.length()), 0.0);
    assert_eq!(b.t_at_length(1e9, b.length()), 1.0);
}

#[test]
fn on_interval_extracts_middle_piece() {
    let b = straight();
    let mid = b.on_interval(0.25, 0.75);
    assert!((mid.p0.x - 7.5).abs() < 1e-9);
    assert!((mid.p3.x - 22.5).abs() < 1e-9);
}

#[test]
fn flatness_check() {
    assert!(straight().is_flat(0.25));
    assert!(!quarter_circle(100.0).is_flat(0.25));
}
