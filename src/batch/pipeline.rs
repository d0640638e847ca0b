//! Batch pipeline.
//!
//! Every selected image runs its own decode, compose and encode chain on the
//! blocking thread pool. Chains finish in any order; results and progress
//! are reported in completion order. A failing image is counted and
//! skipped without affecting its siblings, and the batch is complete once
//! the number of attempts equals the number of selected images.

use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::decoder::{decode_image, DEFAULT_MAX_PIXELS};
use super::encoder::{encode_jpeg, DEFAULT_JPEG_QUALITY};
use super::naming::stamped_file_name;
use super::BatchError;
use crate::error::StampError;
use crate::stamp::{CanvasSize, ComposeOutcome, StampComposer, StampConfig};

/// An image chosen for processing, held as its original encoded bytes.
#[derive(Debug, Clone)]
pub struct SelectedImage {
    /// Original file name, used for output naming and messages.
    pub name: String,
    pub data: Bytes,
}

impl SelectedImage {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Read an image file from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, BatchError> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, data))
    }
}

/// A successfully stamped image.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    /// Download name, `<base>_stamped.jpg`.
    pub name: String,
    /// Name of the image it was produced from.
    pub source_name: String,
    /// Encoded JPEG bytes.
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// An image that could not be processed.
#[derive(Debug, Clone)]
pub struct ImageFailure {
    pub name: String,
    pub error: StampError,
}

/// Running counters, reported after every finished attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    pub processed: usize,
    pub errors: usize,
    pub total: usize,
    /// Set when the attempt that triggered this report failed.
    pub failed_name: Option<String>,
}

impl BatchProgress {
    pub fn new(total: usize) -> Self {
        Self {
            processed: 0,
            errors: 0,
            total,
            failed_name: None,
        }
    }

    pub fn attempts(&self) -> usize {
        self.processed + self.errors
    }

    pub fn is_complete(&self) -> bool {
        self.attempts() == self.total
    }

    /// Attempts as a percentage of the total.
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            return 100.0;
        }
        self.attempts() as f32 / self.total as f32 * 100.0
    }

    /// Progress line for the current state.
    pub fn message(&self) -> String {
        if self.is_complete() {
            return completion_message(self.processed, self.errors, self.total);
        }
        match &self.failed_name {
            Some(name) => format!(
                "Error processing {}. ({}/{})",
                name,
                self.attempts(),
                self.total
            ),
            None => format!("Processing {}/{} images...", self.attempts(), self.total),
        }
    }
}

fn completion_message(processed: usize, errors: usize, total: usize) -> String {
    if errors > 0 {
        format!(
            "Completed. Processed: {}/{}. Errors: {}.",
            processed, total, errors
        )
    } else {
        format!("Completed processing {} images!", total)
    }
}

/// Outcome of a finished batch, in completion order.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub processed: Vec<ProcessedImage>,
    pub failures: Vec<ImageFailure>,
    pub total: usize,
}

impl BatchReport {
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    pub fn error_count(&self) -> usize {
        self.failures.len()
    }

    pub fn status_message(&self) -> String {
        completion_message(self.processed_count(), self.error_count(), self.total)
    }

    /// `(name, bytes)` pairs ready for the archive packager.
    pub fn archive_entries(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.processed
            .iter()
            .map(|image| (image.name.as_str(), image.data.as_slice()))
    }
}

/// Tuning for a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub jpeg_quality: u8,
    /// Images processed at once; 0 uses the number of CPUs.
    pub max_concurrent: usize,
    /// Images with more pixels fail as decode errors.
    pub max_pixels: u64,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            max_concurrent: 0,
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }
}

impl BatchOptions {
    pub fn concurrency(&self) -> usize {
        if self.max_concurrent > 0 {
            return self.max_concurrent;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

/// Stamps a set of images at full resolution.
#[derive(Debug, Clone)]
pub struct BatchPipeline {
    composer: Arc<StampComposer>,
    options: BatchOptions,
}

impl BatchPipeline {
    pub fn new(composer: Arc<StampComposer>, options: BatchOptions) -> Self {
        Self { composer, options }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Process every image, calling `on_progress` after each attempt.
    ///
    /// `config` is snapshotted at the start; the run never fails because
    /// of an individual image.
    pub async fn run<F>(
        &self,
        images: Vec<SelectedImage>,
        config: &StampConfig,
        mut on_progress: F,
    ) -> Result<BatchReport, BatchError>
    where
        F: FnMut(&BatchProgress),
    {
        if images.is_empty() {
            return Err(BatchError::NoImages);
        }

        let total = images.len();
        let config = Arc::new(config.clone());
        let limit = Arc::new(Semaphore::new(self.options.concurrency()));

        info!(
            images = total,
            concurrency = self.options.concurrency(),
            barcode = config.barcode_enabled,
            "Starting batch"
        );

        let mut tasks = JoinSet::new();
        for image in images {
            let composer = Arc::clone(&self.composer);
            let config = Arc::clone(&config);
            let limit = Arc::clone(&limit);
            let options = self.options;

            tasks.spawn(async move {
                let _permit = limit.acquire_owned().await.ok();
                let name = image.name.clone();
                let result = tokio::task::spawn_blocking(move || {
                    process_one(&composer, &config, &image, &options)
                })
                .await
                .unwrap_or_else(|e| Err(StampError::Decode(format!("worker failed: {}", e))));
                (name, result)
            });
        }

        let mut progress = BatchProgress::new(total);
        let mut processed = Vec::with_capacity(total);
        let mut failures = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            let (name, result) = match joined {
                Ok(done) => done,
                Err(e) => (
                    "<unknown>".to_string(),
                    Err(StampError::Decode(format!("task failed: {}", e))),
                ),
            };

            match result {
                Ok(image) => {
                    debug!(source = %image.source_name, output = %image.name, "Image stamped");
                    progress.processed += 1;
                    progress.failed_name = None;
                    processed.push(image);
                }
                Err(error) => {
                    warn!(image = %name, error = %error, "Failed to process image");
                    progress.errors += 1;
                    progress.failed_name = Some(name.clone());
                    failures.push(ImageFailure { name, error });
                }
            }

            on_progress(&progress);
        }

        let report = BatchReport {
            processed,
            failures,
            total,
        };
        info!(
            processed = report.processed_count(),
            errors = report.error_count(),
            total,
            "Batch finished"
        );
        Ok(report)
    }
}

/// Decode, stamp and encode a single image at its natural size.
pub fn process_one(
    composer: &StampComposer,
    config: &StampConfig,
    image: &SelectedImage,
    options: &BatchOptions,
) -> Result<ProcessedImage, StampError> {
    let mut raster = decode_image(&image.data, options.max_pixels)?;
    let (width, height) = raster.dimensions();

    let canvas = CanvasSize::new(width as f32, height as f32);
    if let ComposeOutcome::BarcodeFailed(_) = composer.compose(&mut raster, config, canvas, canvas.width) {
        debug!(image = %image.name, "Stamped barcode error placeholder");
    }

    let data = encode_jpeg(&raster, options.jpeg_quality)?;

    Ok(ProcessedImage {
        name: stamped_file_name(&image.name),
        source_name: image.name.clone(),
        data,
        width,
        height,
    })
}
