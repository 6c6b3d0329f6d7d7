use std::sync::Arc;

use super::*;
use crate::foundation::core::{Color, IRect};
use crate::paint::brush::{Bitmap, Gradient, GradientKind, GradientStop, Spread, Texture};
use crate::raster::Span;

fn red() -> Brush {
    Brush::Solid(Color::rgb(1.0, 0.0, 0.0))
}

#[test]
fn opaque_solid_fill_stores_color() {
    let mut s = Surface::with_size(4, 4);
    Painter::new(&mut s).draw_rle(&VRle::from_rect(IRect::new(1, 1, 2, 2)), &red());
    assert_eq!(s.pixel(1, 1), 0xffff_0000);
    assert_eq!(s.pixel(2, 2), 0xffff_0000);
    assert_eq!(s.pixel(0, 0), 0);
    assert_eq!(s.pixel(3, 3), 0);
}

#[test]
fn partial_coverage_blends_over_existing_pixels() {
    let mut s = Surface::new(vec![0xff00_00ff; 1], 1, 1, 1).unwrap();
    let rle = VRle::from_spans([Span::new(0, 0, 1, 128)]);
    Painter::new(&mut s).draw_rle(&rle, &red());
    let px = s.pixel(0, 0);
    assert_eq!(px >> 24, 0xff);
    assert_eq!((px >> 16) & 0xff, 128);
    assert_eq!(px & 0xff, 127);
}

#[test]
fn draw_region_limits_painting() {
    let mut s = Surface::with_size(4, 1).with_draw_region(IRect::new(2, 0, 2, 1));
    Painter::new(&mut s).draw_rle(&VRle::from_rect(IRect::new(0, 0, 4, 1)), &red());
    assert_eq!(s.pixel(1, 0), 0);
    assert_eq!(s.pixel(2, 0), 0xffff_0000);
}

#[test]
fn clipped_draw_respects_mask() {
    let mut s = Surface::with_size(4, 1);
    let clip = VRle::from_rect(IRect::new(0, 0, 1, 1));
    Painter::new(&mut s).draw_rle_clipped(&VRle::from_rect(IRect::new(0, 0, 4, 1)), &clip, &red());
    assert_eq!(s.pixel(0, 0), 0xffff_0000);
    assert_eq!(s.pixel(1, 0), 0);
}

#[test]
fn linear_gradient_varies_along_axis() {
    let mut s = Surface::with_size(100, 1);
    let brush = Brush::Gradient(Gradient {
        kind: GradientKind::Linear {
            start: Point::new(0.0, 0.0),
            end: Point::new(100.0, 0.0),
        },
        stops: vec![
            GradientStop {
                offset: 0.0,
                color: Color::rgb(0.0, 0.0, 0.0),
            },
            GradientStop {
                offset: 1.0,
                color: Color::rgb(0.0, 0.0, 1.0),
            },
        ],
        spread: Spread::Pad,
        alpha: 1.0,
        transform: Affine::IDENTITY,
    });
    Painter::new(&mut s).draw_rle(&VRle::from_rect(IRect::new(0, 0, 100, 1)), &brush);
    let blue = |x| s.pixel(x, 0) & 0xff;
    assert!(blue(0) < 5);
    assert!(blue(99) > 250);
    assert!(blue(25) < blue(75));
}

#[test]
fn texture_samples_through_inverse_transform() {
    let image = Arc::new(Bitmap::new(1, 1, vec![0xff00_ff00]).unwrap());
    let brush = Brush::Texture(Texture {
        image,
        transform: Affine::translate((2.0, 0.0)),
        alpha: 255,
    });
    let mut s = Surface::with_size(4, 1);
    Painter::new(&mut s).draw_rle(&VRle::from_rect(IRect::new(0, 0, 4, 1)), &brush);
    assert_eq!(s.pixel(1, 0), 0);
    assert_eq!(s.pixel(2, 0), 0xff00_ff00);
    assert_eq!(s.pixel(3, 0), 0);
}

#[test]
fn dest_in_and_out_follow_source_alpha() {
    let layer = Surface::new(vec![0xffff_0000; 2], 2, 1, 2).unwrap();
    let matte = Surface::new(vec![0xff00_0000, 0], 2, 1, 2).unwrap();

    let mut kept = layer.clone();
    composite(&mut kept, &matte, CompositionMode::DestIn, 255);
    assert_eq!(kept.pixels(), &[0xffff_0000, 0]);

    let mut cut = layer.clone();
    composite(&mut cut, &matte, CompositionMode::DestOut, 255);
    assert_eq!(cut.pixels(), &[0, 0xffff_0000]);
}

#[test]
fn luma_matte_uses_brightness() {
    let mut matte = Surface::new(vec![0xffff_ffff, 0xff00_0000], 2, 1, 2).unwrap();
    luma_to_alpha(&mut matte);
    assert_eq!(matte.pixel(0, 0) >> 24, 255);
    assert_eq!(matte.pixel(1, 0) >> 24, 0);
}

#[test]
fn surface_composite_applies_opacity() {
    let mut dst = Surface::with_size(1, 1);
    let src = Surface::new(vec![0xffff_ffff], 1, 1, 1).unwrap();
    composite(&mut dst, &src, CompositionMode::SrcOver, 128);
    assert_eq!(dst.pixel(0, 0), 0x8080_8080);
}
