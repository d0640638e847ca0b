//! Position calculation for stamp placement.
//!
//! This module resolves where a stamp's outer box should be drawn on a
//! canvas, given the box size and the configured placement.
//!
//! # Position Modes
//!
//! - **Fixed anchors**: TopLeft, TopCenter, TopRight, CenterLeft, Center,
//!   CenterRight, BottomLeft, BottomCenter, BottomRight. A margin of
//!   `max(10, 2% of the dimension)` is kept on each axis. No clamping is
//!   applied, so a stamp larger than the canvas yields negative coordinates.
//! - **Free placement**: a normalized center point. The resulting box is
//!   clamped per axis so it never leaves the canvas.
//!
//! # Example
//!
//! ```
//! use codestamp::stamp::geometry::{resolve_point, CanvasSize, StampOrigin, StampSize};
//! use codestamp::stamp::NormalizedPoint;
//!
//! let canvas = CanvasSize::new(800.0, 600.0);
//! let stamp = StampSize::new(100.0, 50.0);
//!
//! let origin = resolve_point(NormalizedPoint::new(0.5, 0.5), &stamp, &canvas);
//! assert_eq!(origin, StampOrigin::new(350.0, 275.0));
//! ```

use super::config::{Anchor, NormalizedPoint, Placement};

/// Minimum anchor margin in pixels.
pub const MIN_ANCHOR_MARGIN: f32 = 10.0;

/// Anchor margin as a fraction of the canvas dimension.
pub const ANCHOR_MARGIN_RATIO: f32 = 0.02;

/// Dimensions of the surface the stamp is drawn onto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl CanvasSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Outer dimensions of the stamp (content plus padding).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StampSize {
    pub width: f32,
    pub height: f32,
}

impl StampSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Grow a content box by `padding` on every side.
    pub fn padded(content_width: f32, content_height: f32, padding: f32) -> Self {
        Self {
            width: content_width + 2.0 * padding,
            height: content_height + 2.0 * padding,
        }
    }
}

/// Top-left corner at which the stamp's outer box is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StampOrigin {
    pub x: f32,
    pub y: f32,
}

impl StampOrigin {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Resolved placement of a stamp: origin plus outer size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StampGeometry {
    pub origin: StampOrigin,
    pub size: StampSize,
}

impl StampGeometry {
    pub fn center(&self) -> (f32, f32) {
        (
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }
}

/// Margins kept between an anchored stamp and the canvas edges.
pub fn anchor_margins(canvas: &CanvasSize) -> (f32, f32) {
    (
        MIN_ANCHOR_MARGIN.max(ANCHOR_MARGIN_RATIO * canvas.width),
        MIN_ANCHOR_MARGIN.max(ANCHOR_MARGIN_RATIO * canvas.height),
    )
}

/// Calculate the origin for a fixed anchor.
///
/// Coordinates may be negative if the stamp is larger than the canvas.
pub fn resolve_anchor(anchor: Anchor, stamp: &StampSize, canvas: &CanvasSize) -> StampOrigin {
    let (mx, my) = anchor_margins(canvas);

    let left = mx;
    let h_center = (canvas.width - stamp.width) / 2.0;
    let right = canvas.width - stamp.width - mx;

    let top = my;
    let v_center = (canvas.height - stamp.height) / 2.0;
    let bottom = canvas.height - stamp.height - my;

    match anchor {
        // Top row
        Anchor::TopLeft => StampOrigin::new(left, top),
        Anchor::TopCenter => StampOrigin::new(h_center, top),
        Anchor::TopRight => StampOrigin::new(right, top),

        // Center row
        Anchor::CenterLeft => StampOrigin::new(left, v_center),
        Anchor::Center => StampOrigin::new(h_center, v_center),
        Anchor::CenterRight => StampOrigin::new(right, v_center),

        // Bottom row
        Anchor::BottomLeft => StampOrigin::new(left, bottom),
        Anchor::BottomCenter => StampOrigin::new(h_center, bottom),
        Anchor::BottomRight => StampOrigin::new(right, bottom),
    }
}

/// Calculate the origin for a free placement centered on `point`.
///
/// The stamp is clamped so it stays inside the canvas.
pub fn resolve_point(point: NormalizedPoint, stamp: &StampSize, canvas: &CanvasSize) -> StampOrigin {
    let center_x = point.x * canvas.width;
    let center_y = point.y * canvas.height;

    let origin = StampOrigin::new(
        center_x - stamp.width / 2.0,
        center_y - stamp.height / 2.0,
    );

    clamp_to_bounds(origin, stamp, canvas)
}

/// Clamp an origin so the stamp stays within the canvas.
///
/// When the stamp is larger than the canvas on an axis, that axis is
/// pinned to 0.
pub fn clamp_to_bounds(origin: StampOrigin, stamp: &StampSize, canvas: &CanvasSize) -> StampOrigin {
    let clamp_axis = |v: f32, max: f32| v.min(max).max(0.0);

    StampOrigin::new(
        clamp_axis(origin.x, canvas.width - stamp.width),
        clamp_axis(origin.y, canvas.height - stamp.height),
    )
}

/// Resolve any placement into a full geometry.
pub fn resolve(placement: &Placement, stamp: StampSize, canvas: &CanvasSize) -> StampGeometry {
    let origin = match placement {
        Placement::Point(point) => resolve_point(*point, &stamp, canvas),
        Placement::Anchor(anchor) => resolve_anchor(*anchor, &stamp, canvas),
    };

    StampGeometry { origin, size: stamp }
}
