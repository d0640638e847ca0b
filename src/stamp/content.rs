//! Content sizing.
//!
//! Computes how much room the stamp's payload needs before anything is
//! drawn. Text is measured with the stamp typeface; barcodes are rendered
//! once and scaled to a percentage of the target surface width, and the
//! raster is kept for drawing so it is never generated twice per stamp.

use image::RgbaImage;
use tracing::warn;

use super::barcode::{BarcodeOptions, BarcodeRenderer};
use super::config::StampConfig;
use super::geometry::StampSize;
use super::text::Typeface;

/// Label drawn in place of a barcode that could not be generated.
pub const BARCODE_ERROR_LABEL: &str = "Barcode Error";

/// Font size of the error label, independent of the configured size.
pub const ERROR_FONT_SIZE: f32 = 16.0;

/// Lowest barcode width percentage actually used.
pub const MIN_BARCODE_WIDTH_PERCENT: i32 = 5;

/// Smallest width or height a scaled barcode may have.
pub const MIN_BARCODE_DIMENSION: f32 = 10.0;

/// What the content box holds.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPayload {
    /// The config's data, drawn as text.
    Text,
    /// A reference barcode raster, drawn scaled to the content box.
    Barcode(RgbaImage),
    /// Barcode generation failed; the label is drawn instead.
    Failed { label: &'static str },
}

/// Size and payload of a stamp's content, computed fresh for every draw.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentDetails {
    pub width: f32,
    pub height: f32,
    pub payload: ContentPayload,
}

impl ContentDetails {
    pub fn failed(&self) -> bool {
        matches!(self.payload, ContentPayload::Failed { .. })
    }

    pub fn error_label(&self) -> Option<&'static str> {
        match self.payload {
            ContentPayload::Failed { label } => Some(label),
            _ => None,
        }
    }

    pub fn payload_raster(&self) -> Option<&RgbaImage> {
        match &self.payload {
            ContentPayload::Barcode(raster) => Some(raster),
            _ => None,
        }
    }

    /// Outer stamp size: content grown by `padding` on every side.
    pub fn outer_size(&self, padding: f32) -> StampSize {
        StampSize::padded(self.width, self.height, padding)
    }
}

/// Barcode width percentage with the lower bound applied.
pub fn effective_barcode_percent(requested: i32) -> i32 {
    requested.max(MIN_BARCODE_WIDTH_PERCENT)
}

/// Target pixel width of a barcode on a surface `base_image_width` wide.
pub fn barcode_target_width(base_image_width: f32, requested_percent: i32) -> f32 {
    base_image_width * (effective_barcode_percent(requested_percent) as f32 / 100.0)
}

/// Measure text content. Height is the font size.
pub fn measure_text(typeface: &Typeface, text: &str, font_size: f32) -> ContentDetails {
    ContentDetails {
        width: typeface.measure(text, font_size),
        height: font_size,
        payload: ContentPayload::Text,
    }
}

/// Size the content for `config` on a surface `base_image_width` pixels wide.
///
/// `base_image_width` must be the width of the surface the stamp is drawn
/// on (full image width on export, preview width on preview) so the same
/// percentage looks the same at every resolution.
pub fn measure_content(
    config: &StampConfig,
    base_image_width: f32,
    typeface: &Typeface,
    barcodes: &dyn BarcodeRenderer,
) -> ContentDetails {
    let font_size = config.font_size as f32;

    if !config.barcode_enabled {
        return measure_text(typeface, &config.data, font_size);
    }

    let target_width = barcode_target_width(base_image_width, config.barcode_width_percent);
    let options = BarcodeOptions::for_stamp(font_size);

    let raster = match barcodes.render(&config.data, &options) {
        Ok(raster) if raster.width() > 0 => raster,
        Ok(_) => {
            warn!(data = %config.data, "Barcode renderer returned a zero-width raster");
            return barcode_failure(typeface);
        }
        Err(e) => {
            warn!(data = %config.data, error = %e, "Barcode generation failed");
            return barcode_failure(typeface);
        }
    };

    let scale = target_width / raster.width() as f32;
    let width = target_width.max(MIN_BARCODE_DIMENSION);
    let height = (raster.height() as f32 * scale).max(MIN_BARCODE_DIMENSION);

    ContentDetails {
        width,
        height,
        payload: ContentPayload::Barcode(raster),
    }
}

fn barcode_failure(typeface: &Typeface) -> ContentDetails {
    ContentDetails {
        width: typeface.measure(BARCODE_ERROR_LABEL, ERROR_FONT_SIZE),
        height: ERROR_FONT_SIZE,
        payload: ContentPayload::Failed {
            label: BARCODE_ERROR_LABEL,
        },
    }
}
