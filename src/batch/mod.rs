//! Batch processing: decode, stamp, encode and package selected images.

pub mod archive;
pub mod decoder;
pub mod encoder;
pub mod naming;
pub mod pipeline;

use thiserror::Error;

use crate::error::StampError;

pub use archive::{package, save_archive, save_file};
pub use naming::{archive_file_name, sanitize_base_name, stamped_file_name};
pub use pipeline::{
    process_one, BatchOptions, BatchPipeline, BatchProgress, BatchReport, ImageFailure,
    ProcessedImage, SelectedImage,
};

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("No images selected")]
    NoImages,

    #[error("No images were successfully processed to download.")]
    NothingToPackage,

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Stamp(#[from] StampError),
}
