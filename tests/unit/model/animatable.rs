use super::*;

fn linear() -> Option<Arc<Interpolator>> {
    Some(Arc::new(Interpolator::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0))))
}

fn ramp() -> Animatable<f32> {
    Animatable::Keyframed(vec![
        Keyframe {
            start_frame: 10.0,
            end_frame: 20.0,
            start: 0.0,
            end: 100.0,
            interpolator: linear(),
            tangents: None,
        },
        Keyframe {
            start_frame: 20.0,
            end_frame: 30.0,
            start: 100.0,
            end: 50.0,
            interpolator: None,
            tangents: None,
        },
    ])
}

#[test]
fn constant_is_static() {
    let a = Animatable::Constant(3.0_f32);
    assert!(a.is_static());
    assert_eq!(a.value(-5.0), 3.0);
    assert!(a.keyframes().is_empty());
}

#[test]
fn keyframes_clamp_outside_range() {
    let a = ramp();
    assert!(!a.is_static());
    assert_eq!(a.value(0.0), 0.0);
    assert_eq!(a.value(10.0), 0.0);
    assert_eq!(a.value(30.0), 50.0);
    assert_eq!(a.value(99.0), 50.0);
}

#[test]
fn linear_keyframe_interpolates() {
    let a = ramp();
    assert!((a.value(15.0) - 50.0).abs() < 1e-3);
    assert!((a.value(12.5) - 25.0).abs() < 1e-3);
}

#[test]
fn hold_keyframe_keeps_start_value() {
    let a = ramp();
    assert_eq!(a.value(20.0), 100.0);
    assert_eq!(a.value(29.9), 100.0);
}

#[test]
fn ease_solver_hits_endpoints_and_is_monotonic() {
    let ease = Interpolator::new(Point::new(0.42, 0.0), Point::new(0.58, 1.0));
    assert_eq!(ease.value(0.0), 0.0);
    assert_eq!(ease.value(1.0), 1.0);
    assert!((ease.value(0.5) - 0.5).abs() < 1e-4);
    let samples: Vec<f64> = (0..=20).map(|i| ease.value(f64::from(i) / 20.0)).collect();
    assert!(samples.windows(2).all(|w| w[0] <= w[1]));
    assert!(ease.value(0.25) < 0.25);
}

#[test]
fn spatial_tangents_bend_the_motion_path() {
    let straight = Point::lerp_spatial(&Point::new(0.0, 0.0), &Point::new(100.0, 0.0), 0.5, None);
    assert!((straight.x - 50.0).abs() < 1e-9);

    let tangents = Tangents {
        out: Vec2::new(0.0, 50.0),
        inn: Vec2::new(0.0, 50.0),
    };
    let bent = Point::lerp_spatial(
        &Point::new(0.0, 0.0),
        &Point::new(100.0, 0.0),
        0.5,
        Some(&tangents),
    );
    assert!((bent.x - 50.0).abs() < 0.5);
    assert!(bent.y > 30.0);
}

#[test]
fn shape_lerp_requires_matching_vertex_counts() {
    let a = ShapeData {
        points: vec![Point::new(0.0, 0.0); 4],
        closed: false,
    };
    let b = ShapeData {
        points: vec![Point::new(10.0, 10.0); 4],
        closed: false,
    };
    let mid = ShapeData::lerp(&a, &b, 0.5);
    assert!(mid.points.iter().all(|p| *p == Point::new(5.0, 5.0)));

    let c = ShapeData {
        points: vec![Point::new(10.0, 10.0); 7],
        closed: true,
    };
    assert_eq!(ShapeData::lerp(&a, &c, 0.5), a);
}

#[test]
fn gradient_lerp_requires_same_size() {
    let a = GradientData(vec![0.0, 0.0, 0.0, 0.0]);
    let b = GradientData(vec![1.0, 1.0, 1.0, 1.0]);
    assert_eq!(GradientData::lerp(&a, &b, 0.5).0, vec![0.5; 4]);
    let c = GradientData(vec![1.0; 8]);
    assert_eq!(GradientData::lerp(&a, &c, 0.5), a);
}
