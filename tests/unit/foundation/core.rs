use super::*;

#[test]
fn canvas_rejects_zero_dimensions() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    let c = Canvas::new(4, 3).unwrap();
    assert_eq!(c.rect(), IRect::new(0, 0, 4, 3));
}

#[test]
fn irect_intersection_and_union() {
    let a = IRect::new(0, 0, 10, 10);
    let b = IRect::new(5, 5, 10, 10);
    assert_eq!(a.intersect(b), IRect::new(5, 5, 5, 5));
    assert_eq!(a.union(b), IRect::new(0, 0, 15, 15));
    assert!(a.intersect(IRect::new(20, 20, 2, 2)).is_empty());
    assert!(a.contains(9, 9));
    assert!(!a.contains(10, 9));
}

#[test]
fn premultiply_roundtrip_is_close() {
    let px = premultiply_argb(200, 100, 50, 128);
    assert_eq!(px >> 24, 128);
    let [r, g, b, a] = unpremultiply_argb(px);
    assert_eq!(a, 128);
    assert!((i32::from(r) - 200).abs() <= 2);
    assert!((i32::from(g) - 100).abs() <= 2);
    assert!((i32::from(b) - 50).abs() <= 2);
    assert_eq!(unpremultiply_argb(0), [0, 0, 0, 0]);
}

#[test]
fn color_alpha_scaling_clamps() {
    let c = Color::rgb(1.0, 0.0, 0.0).with_alpha(0.5);
    assert_eq!(c.to_rgba8(), [255, 0, 0, 128]);
    assert_eq!(Color::WHITE.with_alpha(2.0).a, 1.0);
    assert_eq!(Color::rgb(1.0, 1.0, 1.0).to_argb_premul(), 0xffff_ffff);
}

#[test]
fn affine_scale_matches_uniform_scale() {
    assert!((affine_scale(&Affine::IDENTITY) - 1.0).abs() < 1e-9);
    assert!((affine_scale(&Affine::scale(3.0)) - 3.0).abs() < 1e-9);
    let rotated = Affine::rotate(0.7) * Affine::scale(2.0);
    assert!((affine_scale(&rotated) - 2.0).abs() < 1e-9);
}

#[test]
fn fuzzy_helpers() {
    assert!(fuzzy_eq(1.0, 1.0 + 1e-9));
    assert!(!fuzzy_eq(1.0, 1.01));
    assert!(fuzzy_zero(1e-9));
    assert!(affine_fuzzy_eq(
        &Affine::translate((1.0, 2.0)),
        &Affine::translate((1.0, 2.0 + 1e-9))
    ));
}

#[test]
fn default_color_is_opaque_white() {
    assert_eq!(Color::default(), Color::WHITE);
    assert_eq!(Color::default().to_argb_premul(), 0xffff_ffff);
}
