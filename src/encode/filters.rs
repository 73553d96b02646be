use chrono::{Local, NaiveDateTime, TimeZone};

use crate::clip::ClipRecord;
use crate::config::OverlayConfig;

/// One stage of the `-vf` chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFilter {
    /// `yadif` deinterlacer for interlaced footage
    Deinterlace,

    /// VHS-style date and time in the bottom-right corner, counting from
    /// `epoch` (Unix seconds) plus the frame's presentation time
    TimestampOverlay { epoch: i64 },
}

impl VideoFilter {
    /// Render the stage in ffmpeg filtergraph syntax
    pub fn render(&self, overlay: &OverlayConfig) -> String {
        match self {
            Self::Deinterlace => "yadif".to_string(),
            Self::TimestampOverlay { epoch } => render_timestamp_overlay(*epoch, overlay),
        }
    }
}

/// Decide which filters a clip needs, in application order: deinterlace
/// first, then the timestamp overlay when requested and a capture time is
/// known.
pub fn build_filter_chain(clip: &ClipRecord, include_timestamp: bool) -> Vec<VideoFilter> {
    let mut filters = Vec::new();

    if clip.scan_mode.is_interlaced() {
        filters.push(VideoFilter::Deinterlace);
    }

    if include_timestamp {
        if let Some(captured) = &clip.capture_timestamp {
            filters.push(VideoFilter::TimestampOverlay { epoch: capture_epoch(captured) });
        }
    }

    filters
}

/// Join rendered stages with `,`. `None` when there is nothing to apply, so
/// the caller can omit `-vf` entirely.
pub fn render_chain(filters: &[VideoFilter], overlay: &OverlayConfig) -> Option<String> {
    if filters.is_empty() {
        return None;
    }

    Some(
        filters
            .iter()
            .map(|f| f.render(overlay))
            .collect::<Vec<_>>()
            .join(","),
    )
}

/// Unix seconds for a camera wall-clock reading.
///
/// The reading is interpreted in the local zone because drawtext renders it
/// back with `localtime`, which makes the overlay show the original digits.
pub fn capture_epoch(captured: &NaiveDateTime) -> i64 {
    Local
        .from_local_datetime(captured)
        .earliest()
        .map(|dt| dt.timestamp())
        // Readings inside a DST gap have no local instant
        .unwrap_or_else(|| captured.and_utc().timestamp())
}

fn render_timestamp_overlay(epoch: i64, overlay: &OverlayConfig) -> String {
    let font = overlay.font_path.display();
    let size = overlay.font_size;
    let margin = overlay.margin;
    let color = &overlay.font_color;

    // Date sits one line above the time
    let date = format!(
        r"drawtext=fontfile='{font}':text='%{{pts\:localtime\:{epoch}\:%d %m %Y}}':x=w-tw-{margin}:y=h-th-{margin}-{size}:fontsize={size}:fontcolor={color}"
    );
    let time = format!(
        r"drawtext=fontfile='{font}':text='%{{pts\:localtime\:{epoch}\:%H\\\:%M\\\:%S}}':x=w-tw-{margin}:y=h-th-{margin}:fontsize={size}:fontcolor={color}"
    );

    format!("{date},{time}")
}
