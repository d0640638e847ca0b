//! Stamp composition engine.
//!
//! Turns a [`StampConfig`] into pixels on a raster surface:
//!
//! 1. [`content`] sizes the payload (text or CODE128 barcode).
//! 2. [`geometry`] resolves where the padded box goes.
//! 3. [`renderer`] draws the rounded plate and content into a layer.
//! 4. [`compositor`] blends that layer onto the target with the stamp's opacity.
//!
//! The same pipeline draws previews and full-resolution exports; sizes that
//! depend on the surface (barcode width) are computed from the surface it
//! is drawn on.

pub mod barcode;
pub mod compositor;
pub mod config;
pub mod content;
pub mod geometry;
pub mod renderer;
pub mod text;

pub use barcode::{BarcodeOptions, BarcodeRenderer, Code128Renderer, Symbology};
pub use compositor::{blend_layer, ComposeOutcome, StampComposer};
pub use config::{Anchor, NormalizedPoint, Placement, StampConfig, STAMP_CORNER_RADIUS};
pub use content::{measure_content, ContentDetails, ContentPayload, BARCODE_ERROR_LABEL};
pub use geometry::{CanvasSize, StampGeometry, StampOrigin, StampSize};
pub use renderer::StampLayer;
pub use text::Typeface;
