//! Barcode rasterization.
//!
//! [`BarcodeRenderer`] is the seam between the stamp engine and whatever
//! produces a barcode raster. [`Code128Renderer`] encodes the data with
//! `barcoders` and lays it out like common web barcode generators: white
//! background, bars, and the human-readable value below them, all inside
//! a uniform margin.

use barcoders::sym::code128::Code128;
use image::{Rgba, RgbaImage};
use tracing::debug;

use super::text::Typeface;
use crate::error::StampError;

/// CODE128 character-set B prefix understood by `barcoders`.
const CODE128_SET_B: char = '\u{0181}';

/// Supported linear symbologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbology {
    Code128,
}

/// Layout parameters for a barcode raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarcodeOptions {
    pub format: Symbology,
    pub line_color: Rgba<u8>,
    /// Width of a single module (narrowest bar) in pixels.
    pub module_width: u32,
    /// Height of the bars in pixels.
    pub module_height: u32,
    pub show_value: bool,
    pub value_font_size: f32,
    /// Gap between the bars and the value text.
    pub text_margin: u32,
    /// Blank border on all four sides.
    pub margin: u32,
}

impl BarcodeOptions {
    /// Options used for stamps: 2px modules, 50px bars, 5px margin.
    pub fn for_stamp(value_font_size: f32) -> Self {
        Self {
            value_font_size,
            ..Self::default()
        }
    }
}

impl Default for BarcodeOptions {
    fn default() -> Self {
        Self {
            format: Symbology::Code128,
            line_color: Rgba([0, 0, 0, 255]),
            module_width: 2,
            module_height: 50,
            show_value: true,
            value_font_size: 20.0,
            text_margin: 2,
            margin: 5,
        }
    }
}

/// Produces barcode rasters for the stamp engine.
pub trait BarcodeRenderer: Send + Sync {
    /// Render `data` as a barcode raster.
    ///
    /// Fails when the data cannot be encoded in the requested symbology or
    /// the result would be empty.
    fn render(&self, data: &str, options: &BarcodeOptions) -> Result<RgbaImage, StampError>;
}

/// CODE128 renderer backed by `barcoders`.
#[derive(Debug, Clone)]
pub struct Code128Renderer {
    typeface: Typeface,
}

impl Code128Renderer {
    pub fn new(typeface: Typeface) -> Self {
        Self { typeface }
    }

    /// Encode `data` into module states (1 = bar, 0 = space).
    pub fn encode_modules(data: &str) -> Result<Vec<u8>, StampError> {
        if data.is_empty() {
            return Err(StampError::Barcode("no data to encode".to_string()));
        }

        let mut prefixed = String::with_capacity(data.len() + 2);
        prefixed.push(CODE128_SET_B);
        prefixed.push_str(data);

        let code = Code128::new(prefixed)
            .map_err(|e| StampError::Barcode(format!("cannot encode {:?}: {:?}", data, e)))?;
        Ok(code.encode())
    }
}

impl BarcodeRenderer for Code128Renderer {
    fn render(&self, data: &str, options: &BarcodeOptions) -> Result<RgbaImage, StampError> {
        let modules = match options.format {
            Symbology::Code128 => Self::encode_modules(data)?,
        };

        let bars_width = modules.len() as u32 * options.module_width;
        if bars_width == 0 {
            return Err(StampError::Barcode("barcode rendered zero width".to_string()));
        }

        let (text_width, text_height) = if options.show_value {
            (
                self.typeface.measure(data, options.value_font_size).ceil() as u32,
                options.value_font_size.ceil() as u32 + options.text_margin,
            )
        } else {
            (0, 0)
        };

        // Wide value text widens the symbol; the bars stay centered.
        let inner_width = bars_width.max(text_width);
        let bars_offset = (inner_width - bars_width) / 2;

        let width = inner_width + 2 * options.margin;
        let height = options.module_height + text_height + 2 * options.margin;

        debug!(
            data_len = data.len(),
            modules = modules.len(),
            width,
            height,
            "Rendering CODE128 barcode"
        );

        let mut raster = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));

        let bars_left = options.margin + bars_offset;
        let bars_top = options.margin;
        for (i, module) in modules.iter().enumerate() {
            if *module == 0 {
                continue;
            }
            let x0 = bars_left + i as u32 * options.module_width;
            for x in x0..x0 + options.module_width {
                for y in bars_top..bars_top + options.module_height {
                    raster.put_pixel(x, y, options.line_color);
                }
            }
        }

        if options.show_value {
            let baseline = (options.margin + options.module_height + options.text_margin) as f32
                + options.value_font_size;
            self.typeface.draw_on_baseline(
                &mut raster,
                data,
                width as f32 / 2.0,
                baseline,
                options.value_font_size,
                options.line_color,
            );
        }

        Ok(raster)
    }
}
