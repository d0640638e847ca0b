// Shared fixtures for the end-to-end tests

use codestamp::session::{SessionSettings, StampSession};
use codestamp::batch::SelectedImage;
use codestamp::stamp::StampComposer;
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
            .with_test_writer()
            .try_init();
    });
}

/// Gradient PNG so stamped output differs from flat colour.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut img = RgbaImage::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = Rgba([(x % 255) as u8, (y % 255) as u8, ((x + y) % 255) as u8, 255]);
    }
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
}

pub fn selected_png(name: &str, width: u32, height: u32) -> SelectedImage {
    SelectedImage::new(name, png_bytes(width, height))
}

pub fn session_in(dir: &Path) -> StampSession {
    init_logging();
    let composer = StampComposer::with_embedded_font().expect("embedded font");
    let settings = SessionSettings {
        output_dir: dir.to_path_buf(),
        ..SessionSettings::default()
    };
    StampSession::new(Arc::new(composer), settings)
}

/// Every `.zip` file written into `dir`.
pub fn archives_in(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "zip"))
        .collect()
}

/// Sorted `(name, bytes)` entries of a ZIP archive on disk.
pub fn zip_entries(path: &Path) -> Vec<(String, Vec<u8>)> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        entries.push((entry.name().to_string(), data));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}
