use super::*;
use crate::foundation::core::IRect;
use crate::loader::DefaultImageLoader;
use crate::model::LayerKind;
use crate::model::parser::parse;
use crate::scene::keypath::{KeyPath, PropertyValue};

const RED: &str = r#"{"ty": "fl", "nm": "red", "c": {"a": 0, "k": [1, 0, 0, 1]}, "o": {"a": 0, "k": 100}}"#;
const BLUE_STROKE: &str = r#"{"ty": "st", "nm": "line", "c": {"a": 0, "k": [0, 0, 1, 1]}, "o": {"a": 0, "k": 100}, "w": {"a": 0, "k": 3}}"#;

fn rect(x: f64, size: f64) -> String {
    format!(r#"{{"ty": "rc", "p": {{"a": 0, "k": [{x}, 0]}}, "s": {{"a": 0, "k": [{size}, {size}]}}, "r": {{"a": 0, "k": 0}}}}"#)
}

fn content(shapes: &str) -> ShapeContent {
    let doc = format!(
        r#"{{"fr": 30, "ip": 0, "op": 30, "w": 100, "h": 100,
            "layers": [{{"ty": 4, "nm": "layer", "ip": 0, "op": 30, "shapes": [{shapes}]}}]}}"#
    );
    let comp = parse(&doc, None, &DefaultImageLoader).unwrap();
    let LayerKind::Shape { items } = &comp.layers[0].kind else {
        panic!("expected a shape layer");
    };
    ShapeContent::new(items, &["layer".to_owned()])
}

fn draw_list(c: &ShapeContent) -> Vec<&Drawable> {
    let mut out = Vec::new();
    c.render_list(&mut out);
    out
}

fn solid(d: &Drawable) -> Color {
    match &d.brush {
        Brush::Solid(c) => *c,
        other => panic!("expected a solid brush, got {other:?}"),
    }
}

#[test]
fn paints_apply_to_preceding_paths_in_paint_order() {
    let mut c = content(&format!("{}, {BLUE_STROKE}, {RED}", rect(0.0, 10.0)));
    c.update(0.0, Affine::IDENTITY, 1.0, DirtyFlag::empty());
    let list = draw_list(&c);
    assert_eq!(list.len(), 2);
    // Fill first, the stroke listed above it paints on top.
    assert!(list[0].stroke.is_none());
    assert_eq!(solid(list[0]), Color::rgb(1.0, 0.0, 0.0));
    assert_eq!(list[1].stroke.as_ref().unwrap().style.width, 3.0);
}

#[test]
fn paint_does_not_reach_later_paths() {
    let mut c = content(&format!("{RED}, {}", rect(0.0, 10.0)));
    c.update(0.0, Affine::IDENTITY, 1.0, DirtyFlag::empty());
    assert!(draw_list(&c).is_empty());
}

#[test]
fn outer_paint_reaches_nested_groups_and_multiplies_group_alpha() {
    let shapes = format!(
        r#"{{"ty": "gr", "nm": "inner", "it": [{}, {{"ty": "tr", "o": {{"a": 0, "k": 50}}}}]}}, {RED}"#,
        rect(0.0, 10.0)
    );
    let mut c = content(&shapes);
    c.update(0.0, Affine::IDENTITY, 0.5, DirtyFlag::empty());
    let binding = &c.arena.paths[0].bindings[0];
    assert!(!binding.same_group);
    // Path alpha 0.5 * 0.5, times the outer paint's own group alpha 0.5.
    assert!((solid(&binding.drawable).a - 0.125).abs() < 1e-6);
}

#[test]
fn stroke_width_follows_matrix_scale() {
    let mut c = content(&format!("{}, {BLUE_STROKE}", rect(0.0, 10.0)));
    c.update(0.0, Affine::scale(2.0), 1.0, DirtyFlag::MATRIX);
    let list = draw_list(&c);
    let width = list[0].stroke.as_ref().unwrap().style.width;
    assert!((width - 6.0).abs() < 1e-9, "{width}");
    assert_eq!(list[0].path.bounding_rect(), Rect::new(-10.0, -10.0, 10.0, 10.0));
}

#[test]
fn simultaneous_trim_halves_each_path() {
    let trim = r#"{"ty": "tm", "s": {"a": 0, "k": 0}, "e": {"a": 0, "k": 50}, "o": {"a": 0, "k": 0}, "m": 1}"#;
    let mut c = content(&format!("{}, {}, {BLUE_STROKE}, {trim}", rect(0.0, 10.0), rect(50.0, 20.0)));
    c.update(0.0, Affine::IDENTITY, 1.0, DirtyFlag::empty());
    let lengths: Vec<f64> = c.arena.paths.iter().map(|p| p.device.length()).collect();
    assert!((lengths[0] - 20.0).abs() < 1e-6, "{lengths:?}");
    assert!((lengths[1] - 40.0).abs() < 1e-6, "{lengths:?}");
}

#[test]
fn later_declared_trim_applies_first() {
    let line = r#"{"ty": "sh", "ks": {"a": 0, "k": {"v": [[0, 0], [100, 0]], "i": [[0, 0], [0, 0]], "o": [[0, 0], [0, 0]], "c": false}}}"#;
    let first_half = r#"{"ty": "tm", "s": {"a": 0, "k": 0}, "e": {"a": 0, "k": 50}, "o": {"a": 0, "k": 0}, "m": 1}"#;
    let second_half = r#"{"ty": "tm", "s": {"a": 0, "k": 50}, "e": {"a": 0, "k": 100}, "o": {"a": 0, "k": 0}, "m": 1}"#;
    let group = format!(r#"{{"ty": "gr", "it": [{line}, {first_half}]}}"#);
    let mut c = content(&format!("{group}, {BLUE_STROKE}, {second_half}"));
    c.update(0.0, Affine::IDENTITY, 1.0, DirtyFlag::empty());
    // Outer trim keeps 50..100, then the group's trim keeps its first half.
    let bounds = c.arena.paths[0].device.bounding_rect();
    assert!((bounds.x0 - 50.0).abs() < 0.5, "{bounds:?}");
    assert!((bounds.x1 - 75.0).abs() < 0.5, "{bounds:?}");
}

#[test]
fn oversized_repeater_is_capped() {
    let repeater = r#"{"ty": "rp", "c": {"a": 0, "k": 1e9}, "o": {"a": 0, "k": 0},
        "tr": {"p": {"a": 0, "k": [1, 0]}, "so": {"a": 0, "k": 100}, "eo": {"a": 0, "k": 100}}}"#;
    let mut c = content(&format!("{}, {RED}, {repeater}", rect(0.0, 10.0)));
    c.update(0.0, Affine::IDENTITY, 1.0, DirtyFlag::empty());
    assert_eq!(draw_list(&c).len(), crate::model::content::MAX_REPEATER_COPIES);
}

#[test]
fn individual_trim_spans_paths_end_to_end() {
    let trim = r#"{"ty": "tm", "s": {"a": 0, "k": 0}, "e": {"a": 0, "k": 50}, "o": {"a": 0, "k": 0}, "m": 2}"#;
    // Perimeters 40 and 40: the first half is exactly the first path.
    let mut c = content(&format!("{}, {}, {BLUE_STROKE}, {trim}", rect(0.0, 10.0), rect(50.0, 10.0)));
    c.update(0.0, Affine::IDENTITY, 1.0, DirtyFlag::empty());
    assert!((c.arena.paths[0].device.length() - 40.0).abs() < 1e-6);
    assert!(c.arena.paths[1].device.is_empty());
}

#[test]
fn repeater_instantiates_shifted_copies() {
    let repeater = r#"{"ty": "rp", "c": {"a": 0, "k": 3}, "o": {"a": 0, "k": 0},
        "tr": {"p": {"a": 0, "k": [20, 0]}, "so": {"a": 0, "k": 100}, "eo": {"a": 0, "k": 50}}}"#;
    let mut c = content(&format!("{}, {RED}, {repeater}", rect(0.0, 10.0)));
    c.update(0.0, Affine::IDENTITY, 1.0, DirtyFlag::empty());
    let list = draw_list(&c);
    assert_eq!(list.len(), 3);
    let xs: Vec<f64> = list.iter().map(|d| d.path.bounding_rect().x0).collect();
    assert_eq!(xs, vec![-5.0, 15.0, 35.0]);
    let alphas: Vec<f32> = list.iter().map(|d| solid(d).a).collect();
    assert!((alphas[0] - 1.0).abs() < 1e-6 && (alphas[2] - 0.5).abs() < 1e-6, "{alphas:?}");
}

#[test]
fn static_content_keeps_raster_between_updates() {
    let mut c = content(&format!("{}, {RED}", rect(0.0, 10.0)));
    assert!(c.is_static());
    let clip = IRect::new(-20, -20, 40, 40);
    c.update(0.0, Affine::IDENTITY, 1.0, DirtyFlag::empty());
    for d in c.drawables_mut() {
        d.rasterize(clip);
    }
    c.update(5.0, Affine::IDENTITY, 1.0, DirtyFlag::empty());
    assert!(c.drawables_mut().all(|d| !d.needs_raster(clip) && d.dirty.is_empty()));
}

#[test]
fn overrides_replace_authored_values() {
    let mut c = content(&format!("{}, {BLUE_STROKE}, {RED}", rect(0.0, 10.0)));
    let mut set = OverrideSet::default();
    set.set(KeyPath::parse("layer.red").unwrap(), PropertyValue::FillColor(Color::rgb(0.0, 1.0, 0.0)));
    set.set(KeyPath::parse("**.line").unwrap(), PropertyValue::StrokeWidth(10.0));
    c.apply_overrides(&set);
    c.update(0.0, Affine::IDENTITY, 1.0, DirtyFlag::empty());
    let list = draw_list(&c);
    assert_eq!(solid(list[0]), Color::rgb(0.0, 1.0, 0.0));
    assert_eq!(list[1].stroke.as_ref().unwrap().style.width, 10.0);

    c.apply_overrides(&OverrideSet::default());
    c.update(0.0, Affine::IDENTITY, 1.0, DirtyFlag::empty());
    assert_eq!(solid(draw_list(&c)[0]), Color::rgb(1.0, 0.0, 0.0));
}
