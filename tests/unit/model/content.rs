use super::*;
use crate::geometry::PathElement;

#[test]
fn shape_data_builds_cubic_path() {
    let square = ShapeData::from_vertices(
        &[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ],
        &[],
        &[],
        true,
    );
    assert_eq!(square.points.len(), 13);

    let mut path = VPath::new();
    square.to_path(&mut path);
    let elements = path.elements();
    assert_eq!(elements[0], PathElement::MoveTo);
    assert_eq!(elements.iter().filter(|e| **e == PathElement::CubicTo).count(), 4);
    assert_eq!(elements.last(), Some(&PathElement::Close));
    assert!((path.length() - 40.0).abs() < 1e-6);
}

#[test]
fn open_shape_has_one_segment_less() {
    let line = ShapeData::from_vertices(
        &[Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
        &[Vec2::ZERO, Vec2::new(-3.0, 0.0)],
        &[Vec2::new(3.0, 0.0), Vec2::ZERO],
        false,
    );
    assert_eq!(line.points.len(), 4);
    assert_eq!(line.points[1], Point::new(3.0, 0.0));
    assert_eq!(line.points[2], Point::new(7.0, 0.0));
}

#[test]
fn empty_shape_draws_nothing() {
    let mut path = VPath::new();
    ShapeData::default().to_path(&mut path);
    assert!(path.is_empty());
}

#[test]
fn gradient_stops_fold_opacity() {
    let data = GradientData(vec![
        0.0, 1.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, 1.0, //
        0.0, 1.0, //
        1.0, 0.0,
    ]);
    let stops = data.to_stops(2);
    assert_eq!(stops.len(), 2);
    assert_eq!(stops[0].color.a, 1.0);
    assert_eq!(stops[1].color.a, 0.0);
    assert_eq!(stops[1].color.b, 1.0);

    let opaque = GradientData(vec![0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0]).to_stops(2);
    assert!(opaque.iter().all(|s| s.color.a == 1.0));
}

#[test]
fn dash_appends_offset_last() {
    let dash = Dash {
        pattern: vec![Animatable::Constant(4.0), Animatable::Constant(2.0)],
        offset: Animatable::Constant(1.0),
    };
    assert_eq!(dash.value(0.0), vec![4.0, 2.0, 1.0]);

    let odd = Dash {
        pattern: vec![Animatable::Constant(4.0)],
        offset: Animatable::Constant(0.0),
    };
    assert_eq!(odd.value(0.0), vec![4.0, 4.0, 0.0]);
}

#[test]
fn repeater_max_copies_spans_keyframes() {
    let repeater = Repeater {
        info: ItemInfo::default(),
        copies: Animatable::Keyframed(vec![crate::model::animatable::Keyframe {
            start_frame: 0.0,
            end_frame: 10.0,
            start: 2.0,
            end: 5.5,
            interpolator: None,
            tangents: None,
        }]),
        offset: Animatable::Constant(0.0),
        transform: Transform::default(),
        start_opacity: Animatable::Constant(100.0),
        end_opacity: Animatable::Constant(100.0),
    };
    assert_eq!(repeater.max_copies(), 6);
    assert!(!ContentItem::Repeater(repeater).is_static());
}

#[test]
fn huge_repeater_counts_are_capped() {
    let repeater = Repeater {
        info: ItemInfo::default(),
        copies: Animatable::Constant(1e9),
        offset: Animatable::Constant(0.0),
        transform: Transform::default(),
        start_opacity: Animatable::Constant(100.0),
        end_opacity: Animatable::Constant(100.0),
    };
    assert_eq!(repeater.max_copies(), MAX_REPEATER_COPIES);
}
