use super::*;
use crate::foundation::core::Point;
use crate::loader::DefaultImageLoader;
use crate::model::parser::parse;

const CLIP: IRect = IRect::new(0, 0, 20, 20);
const RED: u32 = 0xffff_0000;

fn tree(layers: &str, assets: &str) -> LayerTree {
    let doc = format!(
        r#"{{"fr": 10, "ip": 0, "op": 20, "w": 20, "h": 20, "assets": [{assets}], "layers": [{layers}]}}"#
    );
    let comp = Arc::new(parse(&doc, None, &DefaultImageLoader).unwrap());
    LayerTree::new(&comp)
}

fn solid_in(ip: f32, op: f32, extra: &str) -> String {
    format!(r##"{{"ty": 1, "sw": 20, "sh": 20, "sc": "#ff0000", "ip": {ip}, "op": {op}{extra}}}"##)
}

fn solid(extra: &str) -> String {
    solid_in(0.0, 20.0, extra)
}

fn render(tree: &mut LayerTree) -> Surface {
    let mut surface = Surface::with_size(20, 20);
    for d in tree.drawables_mut() {
        d.rasterize(CLIP);
    }
    tree.paint_list(&tree.roots, &mut surface, None, CLIP);
    surface
}

#[test]
fn roots_paint_back_to_front_and_parents_chain() {
    let layers = format!(
        r#"{{"ty": 3, "ind": 1, "ip": 0, "op": 20, "ks": {{"p": {{"a": 0, "k": [10, 0]}}}}}},
           {}"#,
        solid(r#", "ind": 2, "parent": 1, "ks": {"p": {"a": 0, "k": [5, 0]}}"#)
    );
    let mut t = tree(&layers, "");
    assert_eq!(t.roots, vec![LayerId(1), LayerId(0)]);
    t.update(0.0, Affine::IDENTITY, DirtyFlag::empty(), CLIP);
    assert_eq!(t.items[1].matrix * Point::ORIGIN, Point::new(15.0, 0.0));
}

#[test]
fn static_layers_skip_repeated_updates() {
    let mut t = tree(&solid(""), "");
    t.update(0.0, Affine::IDENTITY, DirtyFlag::empty(), CLIP);
    t.update(0.0, Affine::IDENTITY, DirtyFlag::empty(), CLIP);
    t.update(7.0, Affine::IDENTITY, DirtyFlag::empty(), CLIP);
    assert_eq!(t.items[0].update_count, 1);
    assert!(t.items[0].flag.is_empty());

    t.update(7.0, Affine::scale(0.5), DirtyFlag::MATRIX, CLIP);
    assert_eq!(t.items[0].update_count, 2);
    assert!(t.items[0].flag.contains(DirtyFlag::MATRIX));
}

#[test]
fn out_of_range_layers_are_hidden() {
    let mut t = tree(&solid_in(5.0, 20.0, ""), "");
    t.update(0.0, Affine::IDENTITY, DirtyFlag::empty(), CLIP);
    assert!(!t.items[0].visible);
    assert!(t.drawables_mut().is_empty());
    t.update(5.0, Affine::IDENTITY, DirtyFlag::empty(), CLIP);
    assert!(t.items[0].visible);
}

#[test]
fn solid_fills_its_rect() {
    let mut t = tree(&solid(r#", "ks": {"o": {"a": 0, "k": 100}}"#), "");
    t.update(0.0, Affine::IDENTITY, DirtyFlag::empty(), CLIP);
    let s = render(&mut t);
    assert!(s.pixels().iter().all(|&p| p == RED));
}

#[test]
fn subtract_mask_cuts_a_hole() {
    let mask = r#", "masksProperties": [{"mode": "s", "o": {"a": 0, "k": 100},
        "pt": {"a": 0, "k": {"v": [[0, 0], [10, 0], [10, 20], [0, 20]], "c": true}}}]"#;
    let mut t = tree(&solid(mask), "");
    t.update(0.0, Affine::IDENTITY, DirtyFlag::empty(), CLIP);
    let s = render(&mut t);
    assert_eq!(s.pixel(2, 5), 0);
    assert_eq!(s.pixel(15, 5), RED);
}

#[test]
fn alpha_matte_keeps_only_matte_coverage() {
    let matte = r##"{"ty": 1, "td": 1, "sw": 10, "sh": 20, "sc": "#ffffff", "ip": 0, "op": 20}"##;
    let layers = format!("{matte}, {}", solid(r#", "tt": 1"#));
    let mut t = tree(&layers, "");
    t.update(0.0, Affine::IDENTITY, DirtyFlag::empty(), CLIP);
    assert_eq!(t.items[1].matte_source, Some(LayerId(0)));
    let s = render(&mut t);
    assert_eq!(s.pixel(5, 5), RED);
    // The matte source itself is not painted.
    assert_eq!(s.pixel(15, 5), 0);
}

#[test]
fn inverted_matte_keeps_the_rest() {
    let matte = r##"{"ty": 1, "td": 1, "sw": 10, "sh": 20, "sc": "#ffffff", "ip": 0, "op": 20}"##;
    let layers = format!("{matte}, {}", solid(r#", "tt": 2"#));
    let mut t = tree(&layers, "");
    t.update(0.0, Affine::IDENTITY, DirtyFlag::empty(), CLIP);
    let s = render(&mut t);
    assert_eq!(s.pixel(5, 5), 0);
    assert_eq!(s.pixel(15, 5), RED);
}

#[test]
fn precomp_children_use_stretched_time_and_clip() {
    let assets = format!(
        r#"{{"id": "inner", "layers": [{}]}}"#,
        solid_in(0.0, 4.0, "")
    );
    let layers = r#"{"ty": 0, "refId": "inner", "w": 10, "h": 20, "ip": 0, "op": 20, "sr": 2}"#;
    let mut t = tree(layers, &assets);
    let child = LayerId(0);
    t.update(6.0, Affine::IDENTITY, DirtyFlag::empty(), CLIP);
    // Child frame 3 is inside [0, 4).
    assert!(t.items[child.0].visible);
    let s = render(&mut t);
    assert_eq!(s.pixel(5, 5), RED);
    assert_eq!(s.pixel(15, 5), 0);

    t.update(10.0, Affine::IDENTITY, DirtyFlag::empty(), CLIP);
    assert!(!t.items[child.0].visible);
}
