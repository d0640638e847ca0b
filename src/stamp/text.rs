//! Text measurement and rendering.
//!
//! All stamp text uses one bold sans-serif face. The embedded DejaVu Sans
//! Bold is used unless a font file is configured.
//!
//! Text height is taken to be the font size everywhere in the stamp engine;
//! no ascent/descent correction is applied to layout.

use ab_glyph::{point, Font, FontArc, GlyphId, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use std::path::Path;
use std::sync::OnceLock;

use super::compositor::blend_pixels;
use crate::error::StampError;

/// Embedded font data (DejaVu Sans Bold, see `fonts/LICENSE-DejaVu.txt`).
const EMBEDDED_FONT_DATA: &[u8] = include_bytes!("fonts/DejaVuSans-Bold.ttf");

static EMBEDDED_FONT: OnceLock<Option<FontArc>> = OnceLock::new();

/// A loaded font face used for measuring and drawing stamp text.
#[derive(Clone)]
pub struct Typeface {
    font: FontArc,
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Typeface")
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

impl Typeface {
    /// The built-in bold sans-serif face.
    pub fn embedded() -> Result<Self, StampError> {
        let font = EMBEDDED_FONT
            .get_or_init(|| FontArc::try_from_slice(EMBEDDED_FONT_DATA).ok())
            .clone()
            .ok_or_else(|| StampError::Font("embedded font data is invalid".to_string()))?;
        Ok(Self { font })
    }

    /// Load a TTF/OTF face from raw bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, StampError> {
        let font = FontArc::try_from_vec(data)
            .map_err(|e| StampError::Font(format!("invalid font data: {}", e)))?;
        Ok(Self { font })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StampError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            StampError::Font(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_bytes(data)
    }

    /// Glyph scale for an em size of `font_size` pixels.
    ///
    /// `PxScale` is the ascent-to-descent height, which is taller than the
    /// em square for most faces.
    pub fn scale(&self, font_size: f32) -> PxScale {
        match self.font.units_per_em() {
            Some(units_per_em) if units_per_em > 0.0 => {
                PxScale::from(font_size * self.font.height_unscaled() / units_per_em)
            }
            _ => PxScale::from(font_size),
        }
    }

    /// Advance width of `text` at `font_size` pixels, including kerning.
    pub fn measure(&self, text: &str, font_size: f32) -> f32 {
        let scaled = self.font.as_scaled(self.scale(font_size));

        let mut width = 0.0f32;
        let mut prev_glyph: Option<GlyphId> = None;

        for c in text.chars() {
            let glyph_id = scaled.glyph_id(c);
            if let Some(prev) = prev_glyph {
                width += scaled.kern(prev, glyph_id);
            }
            width += scaled.h_advance(glyph_id);
            prev_glyph = Some(glyph_id);
        }

        width
    }

    /// Draw `text` centered on `(center_x, center_y)`.
    ///
    /// The vertical center is the middle of the em box, so the visual
    /// result matches a `middle` text baseline.
    pub fn draw_centered(
        &self,
        target: &mut RgbaImage,
        text: &str,
        center_x: f32,
        center_y: f32,
        font_size: f32,
        color: Rgba<u8>,
    ) {
        let scaled = self.font.as_scaled(self.scale(font_size));
        let baseline = center_y + (scaled.ascent() + scaled.descent()) / 2.0;
        self.draw_on_baseline(target, text, center_x, baseline, font_size, color);
    }

    /// Draw `text` horizontally centered on `center_x` with its baseline at `baseline_y`.
    pub fn draw_on_baseline(
        &self,
        target: &mut RgbaImage,
        text: &str,
        center_x: f32,
        baseline_y: f32,
        font_size: f32,
        color: Rgba<u8>,
    ) {
        let scale = self.scale(font_size);
        let scaled = self.font.as_scaled(scale);
        let width = self.measure(text, font_size);

        let (canvas_width, canvas_height) = (target.width() as i32, target.height() as i32);
        let mut cursor_x = center_x - width / 2.0;
        let mut prev_glyph: Option<GlyphId> = None;

        for c in text.chars() {
            let glyph_id = scaled.glyph_id(c);

            if let Some(prev) = prev_glyph {
                cursor_x += scaled.kern(prev, glyph_id);
            }

            let glyph = glyph_id.with_scale_and_position(scale, point(cursor_x, baseline_y));

            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();

                outlined.draw(|px, py, coverage| {
                    let x = px as i32 + bounds.min.x as i32;
                    let y = py as i32 + bounds.min.y as i32;

                    if x >= 0 && y >= 0 && x < canvas_width && y < canvas_height {
                        let alpha = (coverage.clamp(0.0, 1.0) * color[3] as f32) as u8;
                        let pixel = Rgba([color[0], color[1], color[2], alpha]);
                        let existing = *target.get_pixel(x as u32, y as u32);
                        target.put_pixel(x as u32, y as u32, blend_pixels(existing, pixel, 1.0));
                    }
                });
            }

            cursor_x += scaled.h_advance(glyph_id);
            prev_glyph = Some(glyph_id);
        }
    }
}
