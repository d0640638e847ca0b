//! Archive packaging and saving.
//!
//! Processed images are bundled into a single ZIP whose entries are the
//! stamped JPEGs under their download names. Entries are stored without
//! recompression since JPEG data does not shrink further.

use chrono::{DateTime, Utc};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::naming::{archive_file_name, unique_names};
use super::BatchError;

/// Status shown when the download is requested with no successful images.
pub const NOTHING_TO_DOWNLOAD: &str = "No images were successfully processed to download.";

/// Status shown when packaging fails.
pub const ARCHIVE_FAILED: &str = "Error creating ZIP file. See console. Try downloading manually.";

pub fn creating_message(count: usize) -> String {
    format!("Creating ZIP archive with {} images...", count)
}

pub fn downloaded_message(count: usize) -> String {
    format!("ZIP file with {} images downloaded.", count)
}

/// Bundle `(file name, bytes)` entries into a ZIP archive in memory.
///
/// Duplicate names get numeric suffixes so every entry is kept.
pub fn package<'a, I>(entries: I) -> Result<Vec<u8>, BatchError>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let entries: Vec<(&str, &[u8])> = entries.into_iter().collect();
    if entries.is_empty() {
        return Err(BatchError::NothingToPackage);
    }

    let names = unique_names(entries.iter().map(|(name, _)| *name));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, (_, data)) in names.iter().zip(&entries) {
        debug!(entry = %name, bytes = data.len(), "Adding archive entry");
        writer.start_file(name.as_str(), options)?;
        writer.write_all(data)?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

/// Write `data` into `dir` as `file_name`, creating the directory if needed.
pub async fn save_file(dir: &Path, file_name: &str, data: &[u8]) -> Result<PathBuf, BatchError> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, data).await?;
    Ok(path)
}

/// Save a packaged archive under its timestamped name.
pub async fn save_archive(
    archive: &[u8],
    dir: &Path,
    now: DateTime<Utc>,
) -> Result<PathBuf, BatchError> {
    let path = save_file(dir, &archive_file_name(now), archive).await?;
    info!(path = %path.display(), bytes = archive.len(), "Archive saved");
    Ok(path)
}
