// Geometry resolver unit tests

use codestamp::stamp::geometry::{
    anchor_margins, resolve_anchor, resolve_point, CanvasSize, StampOrigin, StampSize,
};
use codestamp::stamp::{Anchor, NormalizedPoint};
use rstest::rstest;

#[rstest]
#[case(640.0, 480.0)]
#[case(1920.0, 1080.0)]
#[case(300.0, 4000.0)]
fn test_top_left_is_margin(#[case] width: f32, #[case] height: f32) {
    let canvas = CanvasSize::new(width, height);
    let stamp = StampSize::new(120.0, 40.0);
    let (mx, my) = anchor_margins(&canvas);

    assert_eq!(mx, 10.0f32.max(0.02 * width));
    assert_eq!(my, 10.0f32.max(0.02 * height));
    assert_eq!(
        resolve_anchor(Anchor::TopLeft, &stamp, &canvas),
        StampOrigin::new(mx, my)
    );

    let bottom_right = resolve_anchor(Anchor::BottomRight, &stamp, &canvas);
    assert_eq!(bottom_right.x, width - 120.0 - mx);
    assert_eq!(bottom_right.y, height - 40.0 - my);
}

#[rstest]
#[case(0.0, 0.0)]
#[case(0.01, 0.02)]
#[case(0.05, 0.0)]
fn test_free_placement_near_origin_stays_inside(#[case] x: f32, #[case] y: f32) {
    let canvas = CanvasSize::new(800.0, 600.0);
    for size in [1.0, 30.0, 300.0, 1200.0] {
        let stamp = StampSize::new(size, size / 2.0);
        let origin = resolve_point(NormalizedPoint::new(x, y), &stamp, &canvas);
        assert!(origin.x >= 0.0, "x was {} for size {}", origin.x, size);
        assert!(origin.y >= 0.0, "y was {} for size {}", origin.y, size);
    }
}

#[rstest]
#[case(100.0, 50.0)]
#[case(33.3, 17.9)]
#[case(799.0, 599.0)]
fn test_free_center_matches_anchor_center(#[case] w: f32, #[case] h: f32) {
    let canvas = CanvasSize::new(800.0, 600.0);
    let stamp = StampSize::new(w, h);

    let free = resolve_point(NormalizedPoint::new(0.5, 0.5), &stamp, &canvas);
    assert_eq!(free, StampOrigin::new((800.0 - w) / 2.0, (600.0 - h) / 2.0));
    assert_eq!(free, resolve_anchor(Anchor::Center, &stamp, &canvas));
}

#[test]
fn test_every_anchor_keeps_small_stamp_inside() {
    let canvas = CanvasSize::new(1000.0, 800.0);
    let stamp = StampSize::new(100.0, 60.0);

    for anchor in Anchor::ALL {
        let origin = resolve_anchor(anchor, &stamp, &canvas);
        assert!(origin.x >= 0.0 && origin.x + stamp.width <= canvas.width, "{}", anchor);
        assert!(origin.y >= 0.0 && origin.y + stamp.height <= canvas.height, "{}", anchor);
    }
}
