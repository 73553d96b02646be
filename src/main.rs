use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, Level};

use jvc_importer::{
    clip::extract_clips,
    config::Config,
    encode::{ProcessRunner, QualityPreset, TranscodeDriver},
};

#[derive(Parser)]
#[command(
    name = "jvc-importer",
    version,
    about = "Import and convert JVC GY-HM100 clips from SD card",
    long_about = "Reads PRIVATE/JVC/BPAV/MEDIAPRO.xml from the card, then converts every listed clip to H.264 + AAC MP4 with ffmpeg, deinterlacing where needed and optionally adding a VHS-style timestamp."
)]
struct Cli {
    /// Path to SD card root (defaults to the current directory)
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Output folder for converted clips
    #[arg(short, long, default_value = "imported")]
    output: PathBuf,

    /// Video encoding quality preset
    #[arg(short, long, value_enum, default_value_t = QualityPreset::High)]
    quality: QualityPreset,

    /// Include VHS-style timestamp in bottom-right corner
    #[arg(long)]
    include_timestamp: bool,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .init();

    info!("Starting jvc-importer v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(&config_path)?
        }
        None => Config::default(),
    };
    config.validate()?;

    let source = match cli.source {
        Some(source) => source,
        None => std::env::current_dir()?,
    };
    info!("SD card path: {:?}", source);
    info!("Output folder: {:?}", cli.output);

    let clips = match extract_clips(&source, &config) {
        Ok(clips) => clips,
        Err(e) => {
            error!("{}", e.user_message());
            return Err(e.into());
        }
    };

    info!("Found {} clips on SD card", clips.len());
    for clip in &clips {
        info!(
            "- {} ({} frames, {}fps, {}ch, {})",
            clip.source_path.display(),
            clip.duration_frames,
            clip.frame_rate,
            clip.audio_channels,
            clip.scan_mode
        );
    }

    if let Err(e) = ProcessRunner::check_available(&config.encoder.ffmpeg_path).await {
        error!("{}", e.user_message());
        return Err(e.into());
    }

    let profile = cli.quality.profile();
    info!(
        "Starting conversion to H.264 + AAC MP4 ({} quality: crf {}, preset {})",
        cli.quality, profile.crf, profile.speed
    );

    let driver = TranscodeDriver::new(&config, ProcessRunner::new());
    let report = driver
        .encode_clips(&clips, &cli.output, &profile, cli.include_timestamp)
        .await;

    let outputs = report.outputs();
    info!("Conversion complete! {} files saved to {:?}", outputs.len(), cli.output);
    for path in &outputs {
        if let Some(name) = path.file_name() {
            info!("- {}", name.to_string_lossy());
        }
    }

    if report.failure_count() > 0 {
        error!("{} clips failed to convert", report.failure_count());
    }

    Ok(())
}
