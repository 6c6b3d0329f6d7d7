use super::*;
use crate::foundation::core::{Color, Rect};
use crate::geometry::Direction;

fn square() -> VPath {
    let mut p = VPath::new();
    p.add_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Direction::Cw);
    p
}

#[test]
fn fill_rasterizes_once_until_geometry_changes() {
    let clip = IRect::new(0, 0, 20, 20);
    let mut d = Drawable::default();
    d.set_path(square());
    assert!(d.needs_raster(clip));
    d.rasterize(clip);
    assert_eq!(d.rle.bounding_rect(), IRect::new(0, 0, 10, 10));
    assert!(!d.needs_raster(clip));

    // A brush change repaints but keeps the coverage.
    d.set_brush(Brush::Solid(Color::rgb(1.0, 0.0, 0.0)));
    assert_eq!(d.dirty, DrawableDirty::BRUSH);
    assert!(!d.needs_raster(clip));

    // A new clip invalidates.
    assert!(d.needs_raster(IRect::new(0, 0, 5, 5)));
}

#[test]
fn stroke_covers_the_outline_band() {
    let clip = IRect::new(-5, -5, 30, 30);
    let mut d = Drawable::default();
    d.set_path(square());
    d.set_stroke(Some(StrokeInfo {
        style: StrokeStyle {
            width: 2.0,
            ..StrokeStyle::default()
        },
        dash: Vec::new(),
    }));
    d.rasterize(clip);
    assert_eq!(d.rle.bounding_rect(), IRect::new(-1, -1, 12, 12));
    // The interior stays uncovered.
    assert!(d.rle.intersect_rect(IRect::new(3, 3, 4, 4)).is_empty());
}

#[test]
fn dashed_stroke_covers_less() {
    let clip = IRect::new(-5, -5, 30, 30);
    let stroke = |dash: Vec<f64>| {
        let mut d = Drawable::default();
        d.set_path(square());
        d.set_stroke(Some(StrokeInfo {
            style: StrokeStyle {
                width: 2.0,
                ..StrokeStyle::default()
            },
            dash,
        }));
        d.rasterize(clip);
        d.rle.spans().iter().map(|s| u64::from(s.len) * u64::from(s.coverage)).sum::<u64>()
    };
    let solid = stroke(Vec::new());
    let dashed = stroke(vec![5.0, 5.0]);
    assert!(dashed < solid * 3 / 4, "{dashed} vs {solid}");
}

#[test]
fn zero_width_stroke_is_empty() {
    let mut d = Drawable::default();
    d.set_path(square());
    d.set_stroke(Some(StrokeInfo {
        style: StrokeStyle {
            width: 0.0,
            ..StrokeStyle::default()
        },
        dash: Vec::new(),
    }));
    d.rasterize(IRect::new(0, 0, 20, 20));
    assert!(d.rle.is_empty());
}
