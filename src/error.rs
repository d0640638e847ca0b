// Error types module

use std::fmt;

/// Centralized error type for stamping operations
///
/// Categorizes failures by the collaborator that produced them so callers
/// can decide at the narrowest boundary whether to recover (barcode, decode)
/// or surface the error (config, font, I/O).
#[derive(Debug, Clone, PartialEq)]
pub enum StampError {
    /// Configuration errors (invalid YAML, missing env vars, out-of-range values)
    Config(String),

    /// Font loading failures
    Font(String),

    /// Barcode generation failed (data not encodable, zero-width raster)
    Barcode(String),

    /// Source image could not be decoded
    Decode(String),

    /// Image exceeds the configured pixel limit
    ImageTooLarge { width: u32, height: u32, max_pixels: u64 },

    /// Composited image could not be encoded
    Encode(String),

    /// Filesystem errors
    Io(String),
}

impl fmt::Display for StampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StampError::Config(msg) => write!(f, "Configuration error: {}", msg),
            StampError::Font(msg) => write!(f, "Font error: {}", msg),
            StampError::Barcode(msg) => write!(f, "Barcode generation failed: {}", msg),
            StampError::Decode(msg) => write!(f, "Failed to decode image: {}", msg),
            StampError::ImageTooLarge {
                width,
                height,
                max_pixels,
            } => write!(
                f,
                "Image {}x{} exceeds the {} pixel limit",
                width, height, max_pixels
            ),
            StampError::Encode(msg) => write!(f, "Failed to encode image: {}", msg),
            StampError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for StampError {}

impl From<std::io::Error> for StampError {
    fn from(err: std::io::Error) -> Self {
        StampError::Io(err.to_string())
    }
}
