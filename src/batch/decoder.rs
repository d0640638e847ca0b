//! Image decoding
//!
//! Reads the header first so oversized images are rejected before any
//! pixel buffer is allocated.

use image::io::Reader as ImageReader;
use image::RgbaImage;
use std::io::Cursor;

use crate::error::StampError;

/// Default limit on decoded pixels (100 megapixels).
pub const DEFAULT_MAX_PIXELS: u64 = 100_000_000;

/// Natural dimensions of an encoded image, read from its header.
pub fn probe_dimensions(data: &[u8]) -> Result<(u32, u32), StampError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| StampError::Decode(e.to_string()))?
        .into_dimensions()
        .map_err(|e| StampError::Decode(e.to_string()))
}

/// Reject images whose pixel count exceeds `max_pixels`.
pub fn validate_dimensions(width: u32, height: u32, max_pixels: u64) -> Result<(), StampError> {
    let pixels = width as u64 * height as u64;
    if pixels > max_pixels {
        return Err(StampError::ImageTooLarge {
            width,
            height,
            max_pixels,
        });
    }
    if pixels == 0 {
        return Err(StampError::Decode(format!(
            "image has no pixels ({}x{})",
            width, height
        )));
    }
    Ok(())
}

/// Decode image data at its natural size into an RGBA raster.
pub fn decode_image(data: &[u8], max_pixels: u64) -> Result<RgbaImage, StampError> {
    let (width, height) = probe_dimensions(data)?;
    validate_dimensions(width, height, max_pixels)?;

    let image = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| StampError::Decode(e.to_string()))?
        .decode()
        .map_err(|e| StampError::Decode(e.to_string()))?;

    Ok(image.to_rgba8())
}
