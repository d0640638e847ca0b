//! Interactive stamping session.
//!
//! Holds the state a user builds up before processing: the selected images,
//! the stamp configuration and the "download all" choice. Processing is
//! refused with a prompt until images, data and a position are all present.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::batch::archive::{
    creating_message, downloaded_message, package, save_archive, save_file, ARCHIVE_FAILED,
    NOTHING_TO_DOWNLOAD,
};
use crate::batch::naming::unique_names;
use crate::batch::{BatchError, BatchOptions, BatchPipeline, BatchProgress, ProcessedImage, SelectedImage};
use crate::error::StampError;
use crate::preview::{render_preview_from_bytes, Preview, PreviewLimits};
use crate::stamp::{StampComposer, StampConfig};

/// Shown when processing is requested before everything is in place.
pub const NOT_READY_PROMPT: &str =
    "Please select images, enter data, and choose a position before processing.";

/// Session-wide settings that survive a reset.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub output_dir: PathBuf,
    pub batch: BatchOptions,
    pub preview: PreviewLimits,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            batch: BatchOptions::default(),
            preview: PreviewLimits::default(),
        }
    }
}

/// Result of asking for the processed images as one archive.
#[derive(Debug, Clone, PartialEq)]
pub enum ArchiveStatus {
    Saved { path: PathBuf, count: usize },
    NothingToDownload,
    Failed { reason: String },
}

impl ArchiveStatus {
    pub fn message(&self) -> String {
        match self {
            Self::Saved { count, .. } => downloaded_message(*count),
            Self::NothingToDownload => NOTHING_TO_DOWNLOAD.to_string(),
            Self::Failed { .. } => ARCHIVE_FAILED.to_string(),
        }
    }
}

/// Counts from a finished batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSummary {
    pub processed: usize,
    pub errors: usize,
    pub total: usize,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// Inputs are incomplete; nothing was drawn.
    NotReady { prompt: &'static str },
    Completed {
        summary: ProcessSummary,
        /// Present when "download all" was on and something was processed.
        archive: Option<ArchiveStatus>,
    },
}

#[derive(Debug)]
pub struct StampSession {
    composer: Arc<StampComposer>,
    settings: SessionSettings,
    config: StampConfig,
    selected: Vec<SelectedImage>,
    processed: Vec<ProcessedImage>,
    download_all: bool,
}

impl StampSession {
    pub fn new(composer: Arc<StampComposer>, settings: SessionSettings) -> Self {
        Self {
            composer,
            settings,
            config: StampConfig::default(),
            selected: Vec::new(),
            processed: Vec::new(),
            download_all: true,
        }
    }

    pub fn config(&self) -> &StampConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut StampConfig {
        &mut self.config
    }

    pub fn set_config(&mut self, config: StampConfig) {
        self.config = config;
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn download_all(&self) -> bool {
        self.download_all
    }

    pub fn set_download_all(&mut self, enabled: bool) {
        self.download_all = enabled;
    }

    /// Replace the current selection.
    pub fn select_images(&mut self, images: Vec<SelectedImage>) {
        self.selected = images;
        info!(count = self.selected.len(), "Images selected");
    }

    pub fn selected(&self) -> &[SelectedImage] {
        &self.selected
    }

    pub fn selection_message(&self) -> String {
        format!("Selected {} image(s)", self.selected.len())
    }

    /// Images stamped by the last run, in completion order.
    pub fn processed(&self) -> &[ProcessedImage] {
        &self.processed
    }

    /// Images selected, data entered and a position chosen.
    pub fn has_required_inputs(&self) -> bool {
        !self.selected.is_empty() && self.config.is_drawable()
    }

    /// Preview of the first selected image, if any.
    pub fn preview(&self) -> Result<Option<Preview>, StampError> {
        let Some(first) = self.selected.first() else {
            return Ok(None);
        };
        render_preview_from_bytes(
            &self.composer,
            &first.data,
            &self.config,
            &self.settings.preview,
            self.settings.batch.max_pixels,
        )
        .map(Some)
    }

    /// Place the stamp at a click on a preview.
    pub fn place_from_preview(&mut self, preview: &Preview, x: f32, y: f32) {
        let point = preview.point_at(x, y);
        self.config.set_custom_position(point.x, point.y);
    }

    /// Stamp every selected image at full resolution.
    ///
    /// With "download all" on, the results are packaged and saved to the
    /// output directory once every image has been attempted.
    pub async fn process<F>(&mut self, on_progress: F) -> Result<ProcessOutcome, BatchError>
    where
        F: FnMut(&BatchProgress),
    {
        if !self.has_required_inputs() {
            return Ok(ProcessOutcome::NotReady {
                prompt: NOT_READY_PROMPT,
            });
        }

        self.processed.clear();

        let pipeline = BatchPipeline::new(Arc::clone(&self.composer), self.settings.batch);
        let report = pipeline
            .run(self.selected.clone(), &self.config, on_progress)
            .await?;

        let summary = ProcessSummary {
            processed: report.processed_count(),
            errors: report.error_count(),
            total: report.total,
            status: report.status_message(),
        };
        self.processed = report.processed;

        let archive = if self.download_all && !self.processed.is_empty() {
            Some(self.download_all_processed().await)
        } else {
            None
        };

        Ok(ProcessOutcome::Completed { summary, archive })
    }

    /// Package the processed images and save the archive.
    pub async fn download_all_processed(&self) -> ArchiveStatus {
        if self.processed.is_empty() {
            return ArchiveStatus::NothingToDownload;
        }

        let count = self.processed.len();
        info!("{}", creating_message(count));

        let entries = self
            .processed
            .iter()
            .map(|image| (image.name.as_str(), image.data.as_slice()));

        let saved = match package(entries) {
            Ok(archive) => save_archive(&archive, &self.settings.output_dir, Utc::now()).await,
            Err(e) => Err(e),
        };

        match saved {
            Ok(path) => ArchiveStatus::Saved { path, count },
            Err(e) => {
                warn!(error = %e, "Failed to create archive");
                ArchiveStatus::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Save every processed image individually under its download name.
    pub async fn save_processed(&self, dir: Option<&Path>) -> Result<Vec<PathBuf>, BatchError> {
        let dir = dir.unwrap_or(self.settings.output_dir.as_path());
        let names = unique_names(self.processed.iter().map(|image| image.name.as_str()));

        let mut paths = Vec::with_capacity(names.len());
        for (name, image) in names.iter().zip(&self.processed) {
            paths.push(save_file(dir, name, &image.data).await?);
        }
        Ok(paths)
    }

    /// Return to the initial state: default stamp settings, "download all"
    /// on, no selected or processed images.
    pub fn reset(&mut self) {
        self.config.reset();
        self.selected.clear();
        self.processed.clear();
        self.download_all = true;
        info!("Session reset");
    }
}
