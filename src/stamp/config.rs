//! Stamp configuration types.
//!
//! This module defines the settings that drive every stamp draw:
//! - The payload (free text or a CODE128 barcode value)
//! - Placement, either a free normalized center point or a fixed anchor
//! - Style parameters (font size, padding, opacity, barcode width)
//!
//! A configuration carries exactly one placement mode at a time. Free
//! placement is the default mode; fixed anchors are available for callers
//! that want margin-based grid placement.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StampError;

/// Corner radius of the stamp's background plate, in pixels.
pub const STAMP_CORNER_RADIUS: f32 = 8.0;

pub const MIN_FONT_SIZE: u32 = 10;
pub const MAX_FONT_SIZE: u32 = 100;
pub const MAX_PADDING: u32 = 50;

// Default values
fn default_font_size() -> u32 {
    24
}

fn default_padding() -> u32 {
    10
}

fn default_barcode_width_percent() -> i32 {
    20
}

fn default_opacity() -> f32 {
    0.9
}

/// Fixed anchor positions.
///
/// Names follow the `vertical-horizontal` keyword form used by the
/// position buttons (`top-left`, `center-right`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::TopCenter,
        Anchor::TopRight,
        Anchor::CenterLeft,
        Anchor::Center,
        Anchor::CenterRight,
        Anchor::BottomLeft,
        Anchor::BottomCenter,
        Anchor::BottomRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopCenter => "top-center",
            Self::TopRight => "top-right",
            Self::CenterLeft => "center-left",
            Self::Center => "center",
            Self::CenterRight => "center-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomCenter => "bottom-center",
            Self::BottomRight => "bottom-right",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Anchor {
    type Err = StampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Anchor::ALL
            .iter()
            .copied()
            .find(|anchor| anchor.as_str() == wanted)
            .ok_or_else(|| StampError::Config(format!("unknown anchor '{}'", s)))
    }
}

/// A stamp center expressed as a fraction of the image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f32,
    pub y: f32,
}

impl NormalizedPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Build a point from a click inside a plane of the given size.
    pub fn from_plane_click(click_x: f32, click_y: f32, plane_width: f32, plane_height: f32) -> Self {
        Self {
            x: click_x / plane_width,
            y: click_y / plane_height,
        }
    }

    pub fn is_normalized(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }
}

impl FromStr for NormalizedPoint {
    type Err = StampError;

    /// Parses `X,Y` where both components are fractions in `[0, 1]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| StampError::Config(format!("expected X,Y but got '{}'", s)))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f32>()
                .map_err(|_| StampError::Config(format!("invalid coordinate '{}'", v.trim())))
        };
        let point = NormalizedPoint::new(parse(x)?, parse(y)?);
        if !point.is_normalized() {
            return Err(StampError::Config(format!(
                "coordinates must be between 0 and 1, got '{}'",
                s
            )));
        }
        Ok(point)
    }
}

/// Where the stamp goes on the image.
///
/// In YAML either a map (`{x: 0.5, y: 0.5}`) or an anchor keyword
/// (`bottom-right`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Placement {
    Point(NormalizedPoint),
    Anchor(Anchor),
}

/// Settings for a single stamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StampConfig {
    /// Literal text or barcode payload.
    pub data: String,

    /// Chosen placement; `None` until the user picks a position.
    pub placement: Option<Placement>,

    /// Font size in pixels for text, or for the barcode's value line.
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// Padding between the content box and the plate edge.
    #[serde(default = "default_padding")]
    pub padding: u32,

    /// Render the data as a CODE128 barcode instead of text.
    pub barcode_enabled: bool,

    /// Barcode width as a percentage of the target surface width.
    /// Values below 5 are raised to 5 when the barcode is drawn.
    #[serde(default = "default_barcode_width_percent")]
    pub barcode_width_percent: i32,

    /// Opacity applied to the whole stamp, 0.0 to 1.0.
    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

impl Default for StampConfig {
    fn default() -> Self {
        Self {
            data: String::new(),
            placement: None,
            font_size: default_font_size(),
            padding: default_padding(),
            barcode_enabled: false,
            barcode_width_percent: default_barcode_width_percent(),
            opacity: default_opacity(),
        }
    }
}

impl StampConfig {
    pub fn new(data: impl AsRef<str>) -> Self {
        let mut config = Self::default();
        config.set_data(data.as_ref());
        config
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = Some(placement);
        self
    }

    pub fn with_point(self, x: f32, y: f32) -> Self {
        self.with_placement(Placement::Point(NormalizedPoint::new(x, y)))
    }

    pub fn with_anchor(self, anchor: Anchor) -> Self {
        self.with_placement(Placement::Anchor(anchor))
    }

    pub fn with_barcode(mut self, width_percent: i32) -> Self {
        self.barcode_enabled = true;
        self.barcode_width_percent = width_percent;
        self
    }

    /// Store the payload with surrounding whitespace removed.
    pub fn set_data(&mut self, raw: &str) {
        self.data = raw.trim().to_string();
    }

    /// Apply a font size typed into the form, clamped to `[10, 100]`.
    ///
    /// Non-numeric input falls back to the minimum.
    pub fn set_font_size_input(&mut self, raw: &str) -> u32 {
        self.font_size = match parse_int_prefix(raw) {
            Some(v) => v.clamp(MIN_FONT_SIZE as i64, MAX_FONT_SIZE as i64) as u32,
            None => MIN_FONT_SIZE,
        };
        self.font_size
    }

    /// Apply a padding typed into the form, clamped to `[0, 50]`.
    pub fn set_padding_input(&mut self, raw: &str) -> u32 {
        self.padding = match parse_int_prefix(raw) {
            Some(v) => v.clamp(0, MAX_PADDING as i64) as u32,
            None => 0,
        };
        self.padding
    }

    /// Apply the opacity slider value (0 to 100).
    pub fn set_opacity_percent(&mut self, percent: u32) {
        self.opacity = percent.min(100) as f32 / 100.0;
    }

    pub fn set_custom_position(&mut self, x: f32, y: f32) {
        self.placement = Some(Placement::Point(NormalizedPoint::new(x, y)));
    }

    pub fn has_data(&self) -> bool {
        !self.data.trim().is_empty()
    }

    /// A stamp can be drawn only with data and a chosen position.
    pub fn is_drawable(&self) -> bool {
        self.has_data() && self.placement.is_some()
    }

    /// Human-readable description of the current placement.
    pub fn position_label(&self) -> String {
        match self.placement {
            None => "Selected Position: None".to_string(),
            Some(Placement::Point(p)) => format!(
                "Selected Position: ({:.1}%, {:.1}%)",
                p.x * 100.0,
                p.y * 100.0
            ),
            Some(Placement::Anchor(a)) => format!("Selected Position: {}", a),
        }
    }

    /// Restore every field to its default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn validate(&self) -> Result<(), StampError> {
        if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&self.font_size) {
            return Err(StampError::Config(format!(
                "font_size must be between {} and {}, got {}",
                MIN_FONT_SIZE, MAX_FONT_SIZE, self.font_size
            )));
        }
        if self.padding > MAX_PADDING {
            return Err(StampError::Config(format!(
                "padding must be between 0 and {}, got {}",
                MAX_PADDING, self.padding
            )));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(StampError::Config(format!(
                "opacity must be between 0.0 and 1.0, got {}",
                self.opacity
            )));
        }
        if self.barcode_width_percent > 100 {
            return Err(StampError::Config(format!(
                "barcode_width_percent must be at most 100, got {}",
                self.barcode_width_percent
            )));
        }
        if let Some(Placement::Point(p)) = self.placement {
            if !p.is_normalized() {
                return Err(StampError::Config(format!(
                    "placement point ({}, {}) must lie within [0, 1]",
                    p.x, p.y
                )));
            }
        }
        Ok(())
    }
}

/// Parse a leading base-10 integer the way form inputs do (`"24px"` → 24).
fn parse_int_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|v| sign * v)
}
