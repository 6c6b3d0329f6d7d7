use super::*;

#[test]
fn new_validates_stride_and_length() {
    assert!(Surface::new(vec![0; 100], 10, 10, 10).is_ok());
    assert!(Surface::new(vec![0; 99], 10, 10, 10).is_err());
    assert!(Surface::new(vec![0; 200], 10, 10, 8).is_err());
    let padded = Surface::new(vec![0; 120], 10, 10, 12).unwrap();
    assert_eq!(padded.stride(), 12);
    assert_eq!(padded.row(3).len(), 10);
}

#[test]
fn zero_sized_surface_is_allowed_and_empty() {
    let s = Surface::new(Vec::new(), 0, 0, 0).unwrap();
    assert!(s.is_empty());
    assert!(s.to_rgba8().is_empty());
}

#[test]
fn draw_region_is_clipped_to_surface() {
    let s = Surface::with_size(10, 10).with_draw_region(IRect::new(5, 5, 20, 20));
    assert_eq!(s.draw_region(), IRect::new(5, 5, 5, 5));
}

#[test]
fn clear_only_touches_draw_region() {
    let s = Surface::new(vec![0xffff_ffff; 16], 4, 4, 4).unwrap();
    let mut s = s.with_draw_region(IRect::new(1, 1, 2, 2));
    s.clear();
    assert_eq!(s.pixel(0, 0), 0xffff_ffff);
    assert_eq!(s.pixel(1, 1), 0);
    assert_eq!(s.pixel(3, 3), 0xffff_ffff);
    assert_eq!(s.into_buffer().iter().filter(|p| **p == 0).count(), 4);
}

#[test]
fn rgba8_export_unpremultiplies() {
    let s = Surface::new(vec![0x8080_0000, 0], 2, 1, 2).unwrap();
    assert_eq!(s.to_rgba8(), vec![255, 0, 0, 128, 0, 0, 0, 0]);
}
