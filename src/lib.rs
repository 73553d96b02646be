//! # JVC Importer
//!
//! Import clips recorded by a JVC GY-HM100 from its SD card and convert them
//! to H.264/AAC MP4 with ffmpeg, optionally burning in a VHS-style date stamp.
//!
//! ## Quick Start
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
//! let clips = extract_clips(".", &config)?;
//!
//! let driver = TranscodeDriver::new(&config, ProcessRunner::new());
//! let report = driver
//!     .encode_clips(&clips, Path::new("imported"), &QualityPreset::default().profile(), false)
//!     .await;
//!
//! for path in report.outputs() {
//!     println!("{}", path.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`clip`] - MEDIAPRO.xml and sidecar parsing into [`ClipRecord`]s
//! - [`encode`] - Filter composition, ffmpeg command building and the batch driver
//! - [`config`] - Card layout, schema and encoder settings
//! - [`error`] - Error types
//!
//! ## Custom runners
//!
//! The driver is generic over [`EncoderRunner`](encode::EncoderRunner), so an
//! alternative executor (a remote worker, a dry run) can be plugged in:
//!
//! ```rust,no_run
//! use jvc_importer::encode::{EncodeInvocation, EncoderExit, EncoderRunner};
//! use jvc_importer::Result;
//!
//! struct DryRun;
//!
//! impl EncoderRunner for DryRun {
//!     async fn run(&self, invocation: &EncodeInvocation, _on_line: &mut dyn FnMut(&str)) -> Result<EncoderExit> {
//!         println!("{}", invocation.display_line());
//!         Ok(EncoderExit::ok())
//!     }
//! }
//! ```

pub mod clip;
pub mod config;
pub mod encode;
pub mod error;

// Re-export commonly used types for convenience
pub use crate::{
    clip::{extract_clips, ClipRecord, ScanMode},
    config::Config,
    encode::{BatchReport, ClipOutcome, EncodingProfile, QualityPreset, TranscodeDriver},
    error::{ImportError, Result},
};
