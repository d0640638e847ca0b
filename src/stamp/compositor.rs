//! Stamp composition.
//!
//! [`StampComposer::compose`] is the single entry point for drawing a stamp
//! onto a surface. It is used both for the low-resolution preview and for
//! full-resolution export; only the canvas size and base width differ.
//!
//! # Example
//!
//! ```ignore
//! use codestamp::stamp::{CanvasSize, StampComposer, StampConfig};
//!
//! let composer = StampComposer::with_embedded_font()?;
//! let config = StampConfig::new("ABC123").with_point(0.5, 0.5);
//! let canvas = CanvasSize::new(image.width() as f32, image.height() as f32);
//!
//! composer.compose(&mut image, &config, canvas, canvas.width);
//! ```

use image::{Rgba, RgbaImage};
use std::sync::Arc;
use tracing::debug;

use super::barcode::{BarcodeRenderer, Code128Renderer};
use super::config::{StampConfig, STAMP_CORNER_RADIUS};
use super::content::{measure_content, ContentPayload};
use super::geometry::{resolve, CanvasSize, StampGeometry};
use super::renderer::{render_error, render_stamp, StampLayer};
use super::text::Typeface;
use crate::error::StampError;

/// What a compose call did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComposeOutcome {
    /// No data or no position; the surface was left untouched.
    Skipped,
    /// The stamp was drawn at the given geometry.
    Stamped(StampGeometry),
    /// The barcode could not be generated; the error placeholder was drawn.
    BarcodeFailed(StampGeometry),
}

impl ComposeOutcome {
    pub fn geometry(&self) -> Option<StampGeometry> {
        match self {
            Self::Skipped => None,
            Self::Stamped(g) | Self::BarcodeFailed(g) => Some(*g),
        }
    }
}

/// Draws stamps onto raster surfaces.
///
/// Holds only immutable resources, so one composer can be shared across
/// threads and reused for any number of images.
#[derive(Clone)]
pub struct StampComposer {
    typeface: Typeface,
    barcodes: Arc<dyn BarcodeRenderer>,
}

impl std::fmt::Debug for StampComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StampComposer")
            .field("typeface", &self.typeface)
            .finish_non_exhaustive()
    }
}

impl StampComposer {
    pub fn new(typeface: Typeface, barcodes: Arc<dyn BarcodeRenderer>) -> Self {
        Self { typeface, barcodes }
    }

    /// Composer using `typeface` for text and a CODE128 renderer for barcodes.
    pub fn with_typeface(typeface: Typeface) -> Self {
        let barcodes = Arc::new(Code128Renderer::new(typeface.clone()));
        Self::new(typeface, barcodes)
    }

    pub fn with_embedded_font() -> Result<Self, StampError> {
        Ok(Self::with_typeface(Typeface::embedded()?))
    }

    pub fn typeface(&self) -> &Typeface {
        &self.typeface
    }

    /// Draw the stamp described by `config` onto `target`.
    ///
    /// `canvas` is the area positions are resolved against and
    /// `base_image_width` the width barcode percentages refer to; both are
    /// the target's own size on export and the preview canvas size on
    /// preview. Missing data or position is a no-op.
    pub fn compose(
        &self,
        target: &mut RgbaImage,
        config: &StampConfig,
        canvas: CanvasSize,
        base_image_width: f32,
    ) -> ComposeOutcome {
        let placement = match config.placement {
            Some(placement) if config.has_data() => placement,
            _ => return ComposeOutcome::Skipped,
        };

        let content = measure_content(
            config,
            base_image_width,
            &self.typeface,
            self.barcodes.as_ref(),
        );

        let padding = config.padding as f32;
        let geometry = resolve(&placement, content.outer_size(padding), &canvas);

        debug!(
            x = geometry.origin.x,
            y = geometry.origin.y,
            width = geometry.size.width,
            height = geometry.size.height,
            barcode = config.barcode_enabled,
            failed = content.failed(),
            "Resolved stamp geometry"
        );

        let (layer, outcome) = match &content.payload {
            ContentPayload::Failed { label } => (
                render_error(label, &geometry, &self.typeface, target.dimensions()),
                ComposeOutcome::BarcodeFailed(geometry),
            ),
            _ => (
                render_stamp(
                    &content,
                    &config.data,
                    &geometry,
                    padding,
                    config.font_size as f32,
                    STAMP_CORNER_RADIUS,
                    &self.typeface,
                    target.dimensions(),
                ),
                ComposeOutcome::Stamped(geometry),
            ),
        };

        blend_layer(target, &layer, config.opacity);
        outcome
    }
}

/// Blend a rendered layer onto the target, clipped to the target bounds.
pub fn blend_layer(target: &mut RgbaImage, layer: &StampLayer, opacity: f32) {
    let target_width = target.width() as i32;
    let target_height = target.height() as i32;

    let layer_width = layer.image.width() as i32;
    let layer_height = layer.image.height() as i32;

    let x_start = layer.x.max(0);
    let y_start = layer.y.max(0);
    let x_end = (layer.x + layer_width).min(target_width);
    let y_end = (layer.y + layer_height).min(target_height);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            let lx = (tx - layer.x) as u32;
            let ly = (ty - layer.y) as u32;

            let stamp_pixel = *layer.image.get_pixel(lx, ly);
            if stamp_pixel[3] == 0 {
                continue;
            }

            let target_pixel = *target.get_pixel(tx as u32, ty as u32);
            target.put_pixel(
                tx as u32,
                ty as u32,
                blend_pixels(target_pixel, stamp_pixel, opacity),
            );
        }
    }
}

/// Porter-Duff "over" with an extra opacity factor on the foreground.
pub(crate) fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let fg_alpha = (foreground[3] as f32 / 255.0) * opacity.clamp(0.0, 1.0);
    let bg_alpha = background[3] as f32 / 255.0;

    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}
