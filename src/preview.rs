//! Preview rendering.
//!
//! The preview shows the first selected image scaled down to fit a box,
//! with the stamp composed at preview scale. Barcode widths are computed
//! from the preview width so proportions match the full-size export.

use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use tracing::debug;

use crate::batch::decoder::decode_image;
use crate::error::StampError;
use crate::stamp::{CanvasSize, ComposeOutcome, NormalizedPoint, StampComposer, StampConfig};

fn default_max_width() -> u32 {
    600
}

fn default_max_height() -> u32 {
    400
}

/// Box the preview image is fitted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewLimits {
    #[serde(default = "default_max_width")]
    pub max_width: u32,
    #[serde(default = "default_max_height")]
    pub max_height: u32,
}

impl Default for PreviewLimits {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
            max_height: default_max_height(),
        }
    }
}

/// Preview canvas size for an image of the given natural size.
///
/// The image is scaled down to the maximum width first, then to the
/// maximum height, keeping its aspect ratio. The canvas width is the
/// fitted width and the height follows from it; both are truncated to
/// whole pixels and never below 1.
pub fn fit_preview_size(width: u32, height: u32, limits: &PreviewLimits) -> (u32, u32) {
    let mut fitted_w = width as f32;
    let mut fitted_h = height as f32;
    let max_w = limits.max_width as f32;
    let max_h = limits.max_height as f32;

    if fitted_w > max_w {
        fitted_h *= max_w / fitted_w;
        fitted_w = max_w;
    }
    if fitted_h > max_h {
        fitted_w *= max_h / fitted_h;
    }

    let canvas_w = fitted_w.floor().max(1.0);
    let canvas_h = (canvas_w / width.max(1) as f32 * height as f32).floor().max(1.0);
    (canvas_w as u32, canvas_h as u32)
}

/// A rendered preview.
#[derive(Debug, Clone)]
pub struct Preview {
    pub image: RgbaImage,
    pub outcome: ComposeOutcome,
}

impl Preview {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Normalized stamp center for a click at `(x, y)` on the preview.
    pub fn point_at(&self, x: f32, y: f32) -> NormalizedPoint {
        NormalizedPoint::from_plane_click(x, y, self.width() as f32, self.height() as f32)
    }

    pub fn to_png(&self) -> Result<Vec<u8>, StampError> {
        let mut buffer = Cursor::new(Vec::new());
        self.image
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| StampError::Encode(format!("png: {}", e)))?;
        Ok(buffer.into_inner())
    }
}

/// Scale `source` into the preview box and compose the stamp on it.
pub fn render_preview(
    composer: &StampComposer,
    source: &RgbaImage,
    config: &StampConfig,
    limits: &PreviewLimits,
) -> Preview {
    let (width, height) = fit_preview_size(source.width(), source.height(), limits);
    let mut image = imageops::resize(source, width, height, FilterType::Triangle);

    let canvas = CanvasSize::new(width as f32, height as f32);
    let outcome = composer.compose(&mut image, config, canvas, canvas.width);

    debug!(
        source_width = source.width(),
        source_height = source.height(),
        width,
        height,
        ?outcome,
        "Rendered preview"
    );

    Preview { image, outcome }
}

/// Decode encoded image bytes and render their preview.
pub fn render_preview_from_bytes(
    composer: &StampComposer,
    data: &[u8],
    config: &StampConfig,
    limits: &PreviewLimits,
    max_pixels: u64,
) -> Result<Preview, StampError> {
    let source = decode_image(data, max_pixels)?;
    Ok(render_preview(composer, &source, config, limits))
}
