//! JPEG encoding for stamped output.

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, ImageEncoder, RgbaImage};
use std::io::Cursor;

use crate::error::StampError;

/// Export quality, the 0.9 JPEG quality factor on a 1-100 scale.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Encode a stamped raster as JPEG.
///
/// JPEG has no alpha channel; transparent pixels are flattened over black.
pub fn encode_jpeg(raster: &RgbaImage, quality: u8) -> Result<Vec<u8>, StampError> {
    let rgb = flatten_to_rgb(raster.as_raw());

    let mut output = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut output, quality.clamp(1, 100));

    encoder
        .write_image(&rgb, raster.width(), raster.height(), ColorType::Rgb8)
        .map_err(|e| StampError::Encode(format!("jpeg: {}", e)))?;

    Ok(output.into_inner())
}

/// Convert RGBA bytes to RGB, compositing over black.
fn flatten_to_rgb(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);

    for chunk in rgba.chunks_exact(4) {
        let alpha = chunk[3] as u16;
        for channel in &chunk[..3] {
            rgb.push(((*channel as u16 * alpha + 127) / 255) as u8);
        }
    }

    rgb
}
