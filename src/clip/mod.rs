//! # Clip Metadata Module
//!
//! Reads the MEDIAPRO.xml manifest written by the JVC GY-HM100 and turns every
//! `<Material>` entry into an immutable [`ClipRecord`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use jvc_importer::{clip::extract_clips, config::Config};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let clips = extract_clips("/media/sdcard", &config)?;
//!
//! for clip in &clips {
//!     println!("{} ({} frames, {})", clip.source_path.display(), clip.duration_frames, clip.scan_mode);
//! }
//! # Ok(())
//! # }
//! ```

pub mod manifest;
pub mod sidecar;
pub mod types;

pub use manifest::{extract_clips, parse_manifest, resolve_uri};
pub use sidecar::{parse_creation_date, read_capture_timestamp};
pub use types::{ClipRecord, ScanMode};
