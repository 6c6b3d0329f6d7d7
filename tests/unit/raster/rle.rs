use std::collections::BTreeSet;

use super::*;

fn covered(rle: &VRle) -> BTreeSet<(i32, i32)> {
    rle.spans()
        .iter()
        .flat_map(|s| (s.x..s.end()).map(move |x| (x, s.y)))
        .collect()
}

fn coverage_at(rle: &VRle, x: i32, y: i32) -> u8 {
    rle.spans()
        .iter()
        .find(|s| s.y == y && x >= s.x && x < s.end())
        .map_or(0, |s| s.coverage)
}

fn assert_normalized(rle: &VRle) {
    for s in rle.spans() {
        assert!(s.len > 0 && s.coverage > 0, "{s:?}");
    }
    for w in rle.spans().windows(2) {
        assert!(
            w[0].y < w[1].y || (w[0].y == w[1].y && w[0].end() <= w[1].x),
            "{:?} / {:?}",
            w[0],
            w[1]
        );
    }
}

fn soft_blob() -> VRle {
    VRle::from_spans([
        Span::new(2, 0, 3, 128),
        Span::new(5, 0, 4, 255),
        Span::new(0, 1, 10, 200),
        Span::new(3, 3, 2, 60),
    ])
}

#[test]
fn from_rect_covers_every_pixel() {
    let r = VRle::from_rect(IRect::new(1, 2, 3, 4));
    assert_eq!(covered(&r).len(), 12);
    assert_eq!(r.bounding_rect(), IRect::new(1, 2, 3, 4));
    assert!(VRle::from_rect(IRect::new(0, 0, 0, 5)).is_empty());
}

#[test]
fn from_spans_drops_empty_and_merges_touching_runs() {
    let r = VRle::from_spans([
        Span::new(0, 0, 0, 255),
        Span::new(0, 0, 4, 255),
        Span::new(4, 0, 2, 255),
        Span::new(8, 0, 2, 0),
    ]);
    assert_eq!(r.spans(), &[Span::new(0, 0, 6, 255)]);
}

#[test]
fn intersection_is_commutative() {
    let a = VRle::from_rect(IRect::new(0, 0, 6, 6));
    let b = soft_blob();
    let ab = &a & &b;
    let ba = &b & &a;
    assert_eq!(ab, ba);
    assert_normalized(&ab);
    assert_eq!(coverage_at(&ab, 2, 0), 128);
    assert_eq!(coverage_at(&ab, 7, 0), 0);
}

#[test]
fn partition_laws_hold_on_covered_pixels() {
    let a = VRle::from_rect(IRect::new(0, 0, 6, 6));
    let b = VRle::from_rect(IRect::new(3, 2, 6, 6));
    let inter = &a & &b;
    let only_a = &a - &b;
    let only_b = &b - &a;
    let pieces = &(&inter | &only_a) | &only_b;
    assert_eq!(covered(&pieces), covered(&(&a | &b)));
    for r in [&inter, &only_a, &only_b, &pieces] {
        assert_normalized(r);
    }
}

#[test]
fn partition_laws_hold_for_faint_coverage() {
    let a = VRle::from_spans([Span::new(0, 0, 4, 10)]);
    let b = VRle::from_spans([Span::new(2, 0, 4, 10)]);
    let inter = &a & &b;
    assert_eq!(coverage_at(&inter, 2, 0), 1);
    let pieces = &(&inter | &(&a - &b)) | &(&b - &a);
    assert_eq!(covered(&pieces), covered(&(&a | &b)));
    assert_eq!(covered(&pieces).len(), 6);
}

#[test]
fn self_subtraction_is_empty() {
    let a = soft_blob();
    assert!((&a - &a).is_empty());
}

#[test]
fn self_union_keeps_pixel_set() {
    let a = soft_blob();
    let u = &a | &a;
    assert_eq!(covered(&u), covered(&a));
    // a + a - a*a/255 never lowers coverage
    assert!(coverage_at(&u, 2, 0) >= 128);
}

#[test]
fn union_blends_shared_rows() {
    let a = VRle::from_spans([Span::new(0, 0, 4, 128)]);
    let b = VRle::from_spans([Span::new(2, 0, 4, 128), Span::new(0, 1, 2, 255)]);
    let u = a.union(&b);
    assert_normalized(&u);
    assert_eq!(coverage_at(&u, 0, 0), 128);
    assert_eq!(coverage_at(&u, 2, 0), 192);
    assert_eq!(coverage_at(&u, 5, 0), 128);
    assert_eq!(coverage_at(&u, 1, 1), 255);
}

#[test]
fn subtraction_saturates() {
    let a = VRle::from_spans([Span::new(0, 0, 4, 100)]);
    let b = VRle::from_spans([Span::new(1, 0, 1, 40), Span::new(2, 0, 1, 200)]);
    let d = a.subtract(&b);
    assert_eq!(coverage_at(&d, 0, 0), 100);
    assert_eq!(coverage_at(&d, 1, 0), 60);
    assert_eq!(coverage_at(&d, 2, 0), 0);
    assert_eq!(coverage_at(&d, 3, 0), 100);
}

#[test]
fn xor_cancels_full_overlap() {
    let a = VRle::from_rect(IRect::new(0, 0, 4, 1));
    let b = VRle::from_rect(IRect::new(2, 0, 4, 1));
    let x = &a ^ &b;
    assert_eq!(
        covered(&x),
        [(0, 0), (1, 0), (4, 0), (5, 0)].into_iter().collect()
    );
}

#[test]
fn invert_flips_coverage() {
    let r = VRle::from_spans([Span::new(0, 0, 2, 255), Span::new(2, 0, 2, 55)]);
    assert_eq!(r.invert().spans(), &[Span::new(2, 0, 2, 200)]);
}

#[test]
fn rect_clip_trims_partial_spans() {
    let c = soft_blob().intersect_rect(IRect::new(3, 0, 4, 2));
    assert_normalized(&c);
    assert_eq!(c.bounding_rect(), IRect::new(3, 0, 4, 2));
    assert_eq!(coverage_at(&c, 3, 0), 128);
    assert_eq!(coverage_at(&c, 6, 1), 200);
    assert!(soft_blob().intersect_rect(IRect::new(50, 50, 2, 2)).is_empty());
}

#[test]
fn alpha_and_translate() {
    let mut r = VRle::from_rect(IRect::new(0, 0, 2, 2)).mul_alpha(128);
    assert!(r.spans().iter().all(|s| s.coverage == 128));
    let shared = r.clone();
    r.translate(5, -1);
    assert!(!r.shares_buffer_with(&shared));
    assert_eq!(r.bounding_rect(), IRect::new(5, -1, 2, 2));
    assert_eq!(shared.bounding_rect(), IRect::new(0, 0, 2, 2));
}
