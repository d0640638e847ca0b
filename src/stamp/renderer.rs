//! Stamp rendering.
//!
//! A stamp is drawn into its own transparent [`StampLayer`] covering the
//! stamp's outer box plus a one pixel border for anti-aliased edges,
//! clipped to the target surface. The
//! compositor then blends that layer onto the target with the configured
//! opacity, so the plate and the content share the same transparency.
//!
//! Coordinates passed in are in target-surface space; the layer records
//! where its top-left pixel lands on the target.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use super::compositor::blend_pixels;
use super::content::{ContentDetails, ContentPayload, ERROR_FONT_SIZE};
use super::geometry::StampGeometry;
use super::text::Typeface;

/// Plate fill colour.
pub const PLATE_FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Plate outline colour.
pub const PLATE_STROKE: Rgba<u8> = Rgba([200, 200, 200, 255]);

/// Plate outline width in pixels.
pub const PLATE_STROKE_WIDTH: f32 = 1.0;

pub const TEXT_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

pub const ERROR_TEXT_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// A rendered stamp and where it goes on the target.
#[derive(Clone)]
pub struct StampLayer {
    pub image: RgbaImage,
    /// Target-space x of the layer's left column.
    pub x: i32,
    /// Target-space y of the layer's top row.
    pub y: i32,
}

impl std::fmt::Debug for StampLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StampLayer")
            .field("dimensions", &(self.image.width(), self.image.height()))
            .field("x", &self.x)
            .field("y", &self.y)
            .finish()
    }
}

impl StampLayer {
    /// Empty layer for `geometry` and its anti-aliased edge, clipped to a
    /// target of `bounds` pixels. At least one pixel is always allocated.
    fn covering(geometry: &StampGeometry, bounds: (u32, u32)) -> Self {
        let x = (geometry.origin.x.floor() as i32 - 1).max(0);
        let y = (geometry.origin.y.floor() as i32 - 1).max(0);
        let right = ((geometry.origin.x + geometry.size.width).ceil() as i32 + 1)
            .min(bounds.0 as i32);
        let bottom = ((geometry.origin.y + geometry.size.height).ceil() as i32 + 1)
            .min(bounds.1 as i32);

        let width = (right - x).max(1) as u32;
        let height = (bottom - y).max(1) as u32;

        Self {
            image: RgbaImage::new(width, height),
            x,
            y,
        }
    }

    /// Target-space center of the pixel at layer coordinates `(lx, ly)`.
    fn pixel_center(&self, lx: u32, ly: u32) -> (f32, f32) {
        (
            (self.x + lx as i32) as f32 + 0.5,
            (self.y + ly as i32) as f32 + 0.5,
        )
    }

    /// Convert a target-space point to layer space.
    fn to_local(&self, x: f32, y: f32) -> (f32, f32) {
        (x - self.x as f32, y - self.y as f32)
    }

    fn blend_at(&mut self, lx: u32, ly: u32, color: Rgba<u8>, coverage: f32) {
        if coverage <= 0.0 {
            return;
        }
        let alpha = (coverage.min(1.0) * color[3] as f32).round() as u8;
        let paint = Rgba([color[0], color[1], color[2], alpha]);
        let existing = *self.image.get_pixel(lx, ly);
        self.image.put_pixel(lx, ly, blend_pixels(existing, paint, 1.0));
    }
}

/// Corner radius actually drawn for a box of the given size.
///
/// Shrinks `radius` so it never exceeds half the width or half the height.
pub fn effective_corner_radius(radius: f32, width: f32, height: f32) -> f32 {
    let mut r = radius.max(0.0);
    if width < 2.0 * r {
        r = width / 2.0;
    }
    if height < 2.0 * r {
        r = height / 2.0;
    }
    r.max(0.0)
}

/// Signed distance from `(px, py)` to the edge of a rounded rectangle.
///
/// Negative inside, positive outside.
fn rounded_rect_distance(px: f32, py: f32, geometry: &StampGeometry, radius: f32) -> f32 {
    let (cx, cy) = geometry.center();
    let half_w = geometry.size.width / 2.0;
    let half_h = geometry.size.height / 2.0;

    let qx = (px - cx).abs() - (half_w - radius);
    let qy = (py - cy).abs() - (half_h - radius);

    let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
    let inside = qx.max(qy).min(0.0);
    outside + inside - radius
}

/// Fraction of the unit pixel centred on `(px, py)` covered by the box.
fn rect_coverage(px: f32, py: f32, geometry: &StampGeometry) -> f32 {
    let overlap = |p: f32, start: f32, len: f32| {
        let lo = (p - 0.5).max(start);
        let hi = (p + 0.5).min(start + len);
        (hi - lo).max(0.0)
    };
    overlap(px, geometry.origin.x, geometry.size.width)
        * overlap(py, geometry.origin.y, geometry.size.height)
}

fn draw_plate(layer: &mut StampLayer, geometry: &StampGeometry, corner_radius: f32) {
    let radius = effective_corner_radius(
        corner_radius,
        geometry.size.width,
        geometry.size.height,
    );
    let half_stroke = PLATE_STROKE_WIDTH / 2.0;

    for ly in 0..layer.image.height() {
        for lx in 0..layer.image.width() {
            let (px, py) = layer.pixel_center(lx, ly);
            let sd = rounded_rect_distance(px, py, geometry, radius);

            layer.blend_at(lx, ly, PLATE_FILL, 0.5 - sd);
            layer.blend_at(lx, ly, PLATE_STROKE, half_stroke + 0.5 - sd.abs());
        }
    }
}

fn draw_barcode(layer: &mut StampLayer, raster: &RgbaImage, left: f32, top: f32, width: f32, height: f32) {
    let width = width.round().max(1.0) as u32;
    let height = height.round().max(1.0) as u32;
    let scaled = imageops::resize(raster, width, height, FilterType::Triangle);

    let (lx, ly) = layer.to_local(left, top);
    imageops::overlay(&mut layer.image, &scaled, lx.round() as i64, ly.round() as i64);
}

/// Draw the stamp plate and its content.
///
/// Text is centred in the outer box; a barcode fills the content box,
/// inset by `padding` from the plate edges. Only the part inside a target
/// of `bounds` pixels is rendered. Must not be called with a failed
/// content result; use [`render_error`] for that.
pub fn render_stamp(
    content: &ContentDetails,
    data: &str,
    geometry: &StampGeometry,
    padding: f32,
    font_size: f32,
    corner_radius: f32,
    typeface: &Typeface,
    bounds: (u32, u32),
) -> StampLayer {
    let mut layer = StampLayer::covering(geometry, bounds);
    draw_plate(&mut layer, geometry, corner_radius);

    match &content.payload {
        ContentPayload::Text => {
            let (cx, cy) = geometry.center();
            let (cx, cy) = layer.to_local(cx, cy);
            typeface.draw_centered(&mut layer.image, data, cx, cy, font_size, TEXT_COLOR);
        }
        ContentPayload::Barcode(raster) => {
            draw_barcode(
                &mut layer,
                raster,
                geometry.origin.x + padding,
                geometry.origin.y + padding,
                content.width,
                content.height,
            );
        }
        ContentPayload::Failed { .. } => {}
    }

    layer
}

/// Draw the barcode failure placeholder: a plain white box with the label
/// centred in red at the fixed error font size.
pub fn render_error(
    label: &str,
    geometry: &StampGeometry,
    typeface: &Typeface,
    bounds: (u32, u32),
) -> StampLayer {
    let mut layer = StampLayer::covering(geometry, bounds);

    for ly in 0..layer.image.height() {
        for lx in 0..layer.image.width() {
            let (px, py) = layer.pixel_center(lx, ly);
            layer.blend_at(lx, ly, PLATE_FILL, rect_coverage(px, py, geometry));
        }
    }

    let (cx, cy) = geometry.center();
    let (cx, cy) = layer.to_local(cx, cy);
    typeface.draw_centered(&mut layer.image, label, cx, cy, ERROR_FONT_SIZE, ERROR_TEXT_COLOR);

    layer
}
