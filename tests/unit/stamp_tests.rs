// Stamp composition unit tests

use codestamp::stamp::content::{effective_barcode_percent, measure_content};
use codestamp::stamp::{
    Anchor, CanvasSize, Code128Renderer, ComposeOutcome, StampComposer, StampConfig, StampSize,
    Typeface,
};
use image::{Rgba, RgbaImage};
use rstest::rstest;

fn surface(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([64, 96, 128, 255]))
}

fn canvas_of(img: &RgbaImage) -> CanvasSize {
    CanvasSize::new(img.width() as f32, img.height() as f32)
}

#[rstest]
fn test_outer_size_is_content_plus_twice_padding(
    #[values(10, 24, 55, 100)] font_size: u32,
    #[values(0, 1, 17, 50)] padding: u32,
) {
    let composer = StampComposer::with_embedded_font().unwrap();
    let mut config = StampConfig::new("Order #1234").with_anchor(Anchor::TopLeft);
    config.font_size = font_size;
    config.padding = padding;

    let mut img = surface(1600, 1200);
    let canvas = canvas_of(&img);
    let geometry = composer
        .compose(&mut img, &config, canvas, 1600.0)
        .geometry()
        .expect("stamp should be drawn");

    let text_width = composer.typeface().measure("Order #1234", font_size as f32);
    assert_eq!(
        geometry.size,
        StampSize::new(
            text_width + 2.0 * padding as f32,
            font_size as f32 + 2.0 * padding as f32
        )
    );
}

#[rstest]
#[case(-100)]
#[case(-1)]
#[case(0)]
#[case(1)]
#[case(5)]
fn test_small_barcode_percentages_use_five(#[case] requested: i32) {
    assert_eq!(effective_barcode_percent(requested), 5);

    let face = Typeface::embedded().unwrap();
    let renderer = Code128Renderer::new(face.clone());
    let config = StampConfig::new("ABC123").with_barcode(requested);

    let details = measure_content(&config, 1000.0, &face, &renderer);
    assert_eq!(details.width, 50.0);
    assert!(!details.failed());
}

#[test]
fn test_barcode_stamp_keeps_raster_aspect_ratio() {
    let face = Typeface::embedded().unwrap();
    let renderer = Code128Renderer::new(face.clone());
    let config = StampConfig::new("ABC123").with_barcode(50);

    let details = measure_content(&config, 2000.0, &face, &renderer);
    let raster = details.payload_raster().expect("barcode raster");

    let expected_height = raster.height() as f32 * (1000.0 / raster.width() as f32);
    assert_eq!(details.width, 1000.0);
    assert!((details.height - expected_height).abs() < 1e-3);
}

#[test]
fn test_compose_twice_is_byte_identical() {
    let composer = StampComposer::with_embedded_font().unwrap();
    let configs = [
        StampConfig::new("ABC123").with_point(0.5, 0.5),
        StampConfig::new("ABC123").with_barcode(35).with_point(0.9, 0.1),
        StampConfig::new("Ω unsupported").with_barcode(20).with_anchor(Anchor::BottomCenter),
    ];

    for config in configs {
        let mut first = surface(900, 700);
        let mut second = surface(900, 700);
        let canvas = canvas_of(&first);
        let a = composer.compose(&mut first, &config, canvas, 900.0);
        let canvas = canvas_of(&second);
        let b = composer.compose(&mut second, &config, canvas, 900.0);

        assert_eq!(a, b);
        assert_eq!(first.as_raw(), second.as_raw());
    }
}

#[test]
fn test_unencodable_barcode_draws_placeholder() {
    let composer = StampComposer::with_embedded_font().unwrap();
    let config = StampConfig::new("Ω unsupported")
        .with_barcode(20)
        .with_anchor(Anchor::Center);

    let mut img = surface(600, 400);
    let canvas = canvas_of(&img);
    let outcome = composer.compose(&mut img, &config, canvas, 600.0);
    assert!(matches!(outcome, ComposeOutcome::BarcodeFailed(_)));
    assert_ne!(img, surface(600, 400));
}

#[test]
fn test_stamp_larger_than_image_is_clipped() {
    let composer = StampComposer::with_embedded_font().unwrap();
    let mut config = StampConfig::new("A very long stamp that cannot fit").with_anchor(Anchor::Center);
    config.font_size = 100;

    let mut img = surface(120, 60);
    let canvas = canvas_of(&img);
    let outcome = composer.compose(&mut img, &config, canvas, 120.0);
    let geometry = outcome.geometry().unwrap();

    assert!(geometry.origin.x < 0.0);
    assert_eq!(img.dimensions(), (120, 60));
}
