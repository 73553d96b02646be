use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// How the camera captured the frames of a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    Progressive,
    Interlaced,
}

impl ScanMode {
    /// Interpret the trailing marker of a manifest `fps` value.
    ///
    /// Only `p` means progressive; any other character is treated as
    /// interlaced, so unexpected markers never fail extraction.
    pub fn from_marker(marker: char) -> Self {
        if marker == 'p' {
            Self::Progressive
        } else {
            Self::Interlaced
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Progressive => "progressive",
            Self::Interlaced => "interlaced",
        }
    }

    pub fn is_interlaced(&self) -> bool {
        matches!(self, Self::Interlaced)
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded clip as described by the card manifest
///
/// Records are built once during extraction and only read afterwards; the
/// transcode driver borrows them and never mutates them.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipRecord {
    /// Material `uri` from the manifest, unique within a manifest
    pub identifier: String,

    /// Essence file resolved beneath the BPAV root. Not checked for
    /// existence until the clip is transcoded.
    pub source_path: PathBuf,

    /// Total frame count, used as the progress bound
    pub duration_frames: u64,

    /// Frames per second, always positive
    pub frame_rate: f64,

    /// Interlaced or progressive, from the `i`/`p` suffix of `fps`
    pub scan_mode: ScanMode,

    /// Display aspect ratio as written on the card, e.g. `16:9`
    pub aspect_ratio: String,

    /// Number of recorded audio channels
    pub audio_channels: u32,

    /// Video codec label from the manifest, e.g. `AVC_1920_1080_HP@L41`
    pub video_essence_type: String,

    /// Audio codec label from the manifest, e.g. `LPCM16`
    pub audio_essence_type: String,

    /// Wall-clock capture time read from the sidecar, if any
    pub capture_timestamp: Option<NaiveDateTime>,
}

impl ClipRecord {
    /// File name of the essence file, used for log lines and output naming
    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.identifier.clone())
    }

    /// Clip length in seconds derived from frame count and rate
    pub fn duration_seconds(&self) -> f64 {
        self.duration_frames as f64 / self.frame_rate
    }
}

/// Split a manifest frame-rate value such as `29.97p` or `59.94i` into its
/// numeric rate and scan mode. Returns `None` when the numeric part is not a
/// positive finite number.
pub fn parse_frame_rate(value: &str) -> Option<(f64, ScanMode)> {
    let value = value.trim();
    let marker = value.chars().last()?;
    let numeric = &value[..value.len() - marker.len_utf8()];

    let rate: f64 = numeric.parse().ok()?;
    if !rate.is_finite() || rate <= 0.0 {
        return None;
    }

    Some((rate, ScanMode::from_marker(marker)))
}
