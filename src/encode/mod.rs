//! # Transcode Module
//!
//! Turns clip records into ffmpeg invocations and runs them one at a time.
//!
//! ## Core Features
//!
//! - **Filter composition**: deinterlacing for interlaced footage and an
//!   optional VHS-style date/time overlay that ticks with playback
//! - **Command building**: pure argument assembly, testable without ffmpeg
//! - **Progress tracking**: `frame=` reports from `-progress pipe:1` drive a
//!   per-clip progress bar
//! - **Batch isolation**: a failing clip is recorded and the batch moves on
//!
//! ## Usage
//!
//! ```rust,no_run
//! use jvc_importer::{
//!     clip::extract_clips,
//!     config::Config,
//!     encode::{ProcessRunner, QualityPreset, TranscodeDriver},
//! };
//! use std::path::Path;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let clips = extract_clips("/media/sdcard", &config)?;
//!
//! let driver = TranscodeDriver::new(&config, ProcessRunner::new());
//! let report = driver
//!     .encode_clips(&clips, Path::new("imported"), &QualityPreset::High.profile(), true)
//!     .await;
//!
//! println!("{} converted, {} failed", report.success_count(), report.failure_count());
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod driver;
pub mod filters;
pub mod preset;
pub mod progress;
pub mod runner;

pub use command::{build_command, destination_path, output_file_name, EncodeInvocation};
pub use driver::{BatchReport, ClipOutcome, TranscodeDriver};
pub use filters::{build_filter_chain, capture_epoch, render_chain, VideoFilter};
pub use preset::{EncodingProfile, QualityPreset};
pub use progress::{parse_frame_line, ClipProgress, FrameTracker};
pub use runner::{EncoderExit, EncoderRunner, ProcessRunner};
