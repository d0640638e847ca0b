use anyhow::{bail, Context};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use codestamp::batch::archive::{creating_message, NOTHING_TO_DOWNLOAD};
use codestamp::batch::{BatchProgress, SelectedImage};
use codestamp::config::AppConfig;
use codestamp::logging::{init_subscriber, LogFormat};
use codestamp::session::{ArchiveStatus, ProcessOutcome, StampSession};
use codestamp::stamp::{Anchor, ComposeOutcome, NormalizedPoint, Placement, StampConfig};

/// CodeStamp - stamp text or CODE128 barcodes onto batches of images
#[derive(Parser, Debug)]
#[command(name = "codestamp")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log output format (pretty or json)
    #[arg(long, default_value = "pretty")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stamp every image at full resolution and export JPEGs
    Process {
        /// Images to stamp
        #[arg(required = true)]
        images: Vec<PathBuf>,

        #[command(flatten)]
        stamp: StampArgs,

        /// Directory for the archive or individual files
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write individual JPEGs instead of one ZIP archive
        #[arg(long)]
        no_zip: bool,
    },

    /// Render a scaled-down preview of one image as PNG
    Preview {
        image: PathBuf,

        #[command(flatten)]
        stamp: StampArgs,

        /// Where to write the preview
        #[arg(short, long, default_value = "preview.png")]
        output: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct StampArgs {
    /// Text or barcode value
    #[arg(long)]
    data: Option<String>,

    /// Stamp center as fractions of width and height, e.g. 0.5,0.5
    #[arg(long, value_name = "X,Y", conflicts_with = "anchor")]
    at: Option<NormalizedPoint>,

    /// Fixed anchor such as top-left, center or bottom-right
    #[arg(long)]
    anchor: Option<Anchor>,

    /// Font size in pixels (10-100)
    #[arg(long)]
    font_size: Option<String>,

    /// Padding around the content in pixels (0-50)
    #[arg(long)]
    padding: Option<String>,

    /// Stamp opacity from 0.0 to 1.0
    #[arg(long)]
    opacity: Option<f32>,

    /// Render the data as a CODE128 barcode
    #[arg(long)]
    barcode: bool,

    /// Barcode width as a percentage of the image width
    #[arg(long, allow_negative_numbers = true)]
    barcode_width: Option<i32>,
}

impl StampArgs {
    fn apply(&self, config: &mut StampConfig) {
        if let Some(data) = &self.data {
            config.set_data(data);
        }
        if let Some(point) = self.at {
            config.placement = Some(Placement::Point(point));
        }
        if let Some(anchor) = self.anchor {
            config.placement = Some(Placement::Anchor(anchor));
        }
        if let Some(size) = &self.font_size {
            config.set_font_size_input(size);
        }
        if let Some(padding) = &self.padding {
            config.set_padding_input(padding);
        }
        if let Some(opacity) = self.opacity {
            config.opacity = opacity;
        }
        if self.barcode {
            config.barcode_enabled = true;
        }
        if let Some(width) = self.barcode_width {
            config.barcode_width_percent = width;
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_file(path)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(AppConfig::default()),
    }
}

fn print_progress(progress: &BatchProgress) {
    println!("[{:>3.0}%] {}", progress.percent(), progress.message());
}

async fn read_selection(paths: &[PathBuf]) -> Vec<SelectedImage> {
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        match SelectedImage::from_path(path).await {
            Ok(image) => images.push(image),
            Err(e) => {
                // Unreadable files stay selected and count as failed attempts
                tracing::warn!(path = %path.display(), error = %e, "Failed to read image");
                images.push(SelectedImage::new(path.display().to_string(), Bytes::new()));
            }
        }
    }
    images
}

async fn run_process(
    mut config: AppConfig,
    images: Vec<PathBuf>,
    stamp: StampArgs,
    output: Option<PathBuf>,
    no_zip: bool,
) -> anyhow::Result<()> {
    stamp.apply(&mut config.stamp);
    if let Some(dir) = output {
        config.output.dir = dir;
    }
    config.validate().map_err(anyhow::Error::msg)?;

    let composer = Arc::new(config.build_composer()?);
    let mut session = StampSession::new(composer, config.session_settings());
    session.set_config(config.stamp.clone());
    session.set_download_all(config.output.download_all && !no_zip);

    session.select_images(read_selection(&images).await);
    println!("{}", session.selection_message());
    println!("{}", session.config().position_label());

    let outcome = session.process(print_progress).await?;
    let (summary, archive) = match outcome {
        ProcessOutcome::NotReady { prompt } => bail!(prompt),
        ProcessOutcome::Completed { summary, archive } => (summary, archive),
    };

    tracing::info!(
        processed = summary.processed,
        errors = summary.errors,
        total = summary.total,
        "Processing complete"
    );

    if !session.download_all() {
        for path in session.save_processed(None).await? {
            println!("Saved {}", path.display());
        }
        return Ok(());
    }

    match archive {
        Some(status) => {
            println!("{}", creating_message(summary.processed));
            println!("{}", status.message());
            match status {
                ArchiveStatus::Saved { path, .. } => println!("Saved {}", path.display()),
                ArchiveStatus::Failed { reason } => eprintln!("{}", reason),
                ArchiveStatus::NothingToDownload => {}
            }
        }
        None => println!("{}", NOTHING_TO_DOWNLOAD),
    }

    Ok(())
}

async fn run_preview(
    mut config: AppConfig,
    image: PathBuf,
    stamp: StampArgs,
    output: PathBuf,
) -> anyhow::Result<()> {
    stamp.apply(&mut config.stamp);
    config.validate().map_err(anyhow::Error::msg)?;

    let composer = Arc::new(config.build_composer()?);
    let mut session = StampSession::new(composer, config.session_settings());
    session.set_config(config.stamp.clone());

    let selected = SelectedImage::from_path(&image)
        .await
        .with_context(|| format!("Failed to read {}", image.display()))?;
    session.select_images(vec![selected]);

    let preview = session
        .preview()?
        .context("No image selected for preview")?;

    if preview.outcome == ComposeOutcome::Skipped {
        println!("{}", session.config().position_label());
        println!("Nothing stamped: enter data and choose a position.");
    }

    tokio::fs::write(&output, preview.to_png()?)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "Preview {}x{} written to {}",
        preview.width(),
        preview.height(),
        output.display()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging subsystem
    init_subscriber(args.log_format).map_err(|e| anyhow::anyhow!(e))?;

    let config = load_config(args.config.as_ref())?;

    tracing::debug!(
        config_file = ?args.config,
        output_dir = %config.output.dir.display(),
        custom_font = config.font_path.is_some(),
        "Configuration loaded"
    );

    match args.command {
        Command::Process {
            images,
            stamp,
            output,
            no_zip,
        } => run_process(config, images, stamp, output, no_zip).await,
        Command::Preview {
            image,
            stamp,
            output,
        } => run_preview(config, image, stamp, output).await,
    }
}
