// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::batch::decoder::DEFAULT_MAX_PIXELS;
use crate::batch::encoder::DEFAULT_JPEG_QUALITY;
use crate::batch::BatchOptions;
use crate::error::StampError;
use crate::preview::PreviewLimits;
use crate::session::SessionSettings;
use crate::stamp::{StampComposer, StampConfig, Typeface};

fn default_output_dir() -> PathBuf {
    PathBuf::from("./stamped")
}

fn default_download_all() -> bool {
    true
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

fn default_max_pixels() -> u64 {
    DEFAULT_MAX_PIXELS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    /// Package all processed images into one ZIP when the batch completes.
    #[serde(default = "default_download_all")]
    pub download_all: bool,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            download_all: default_download_all(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Images processed at once; 0 means one per CPU.
    #[serde(default)]
    pub max_concurrent: usize,
    #[serde(default = "default_max_pixels")]
    pub max_pixels: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 0,
            max_pixels: default_max_pixels(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub stamp: StampConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub preview: PreviewLimits,
    #[serde(default)]
    pub batch: BatchConfig,
    /// TTF/OTF file replacing the embedded font.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

        for caps in re.captures_iter(yaml) {
            let var_name = &caps[1];
            std::env::var(var_name).map_err(|_| {
                format!(
                    "Environment variable '{}' is referenced but not set",
                    var_name
                )
            })?;
        }

        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        });

        if substituted.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut config: AppConfig =
            serde_yaml::from_str(&substituted).map_err(|e| e.to_string())?;

        // Data typed into a config file gets the same trimming as the form
        let data = config.stamp.data.clone();
        config.stamp.set_data(&data);

        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.stamp.validate().map_err(|e| e.to_string())?;

        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(format!(
                "output.jpeg_quality must be between 1 and 100, got {}",
                self.output.jpeg_quality
            ));
        }

        if self.preview.max_width == 0 || self.preview.max_height == 0 {
            return Err(format!(
                "preview dimensions must be greater than 0, got {}x{}",
                self.preview.max_width, self.preview.max_height
            ));
        }

        if self.batch.max_pixels == 0 {
            return Err("batch.max_pixels must be greater than 0".to_string());
        }

        if let Some(path) = &self.font_path {
            if path.as_os_str().is_empty() {
                return Err("font_path cannot be empty".to_string());
            }
        }

        Ok(())
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            jpeg_quality: self.output.jpeg_quality,
            max_concurrent: self.batch.max_concurrent,
            max_pixels: self.batch.max_pixels,
        }
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            output_dir: self.output.dir.clone(),
            batch: self.batch_options(),
            preview: self.preview,
        }
    }

    /// The configured font, or the embedded one.
    pub fn load_typeface(&self) -> Result<Typeface, StampError> {
        match &self.font_path {
            Some(path) => Typeface::from_file(path),
            None => Typeface::embedded(),
        }
    }

    pub fn build_composer(&self) -> Result<StampComposer, StampError> {
        Ok(StampComposer::with_typeface(self.load_typeface()?))
    }
}
