use std::sync::LazyLock;

use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;

static FRAME_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^frame=(\d+)").expect("frame pattern is valid"));

/// Extract the cumulative frame count from an ffmpeg `-progress` line.
/// Every other key (`fps=`, `out_time=`, `progress=` ...) yields `None`.
pub fn parse_frame_line(line: &str) -> Option<u64> {
    FRAME_LINE
        .captures(line.trim())
        .and_then(|caps| caps[1].parse().ok())
}

/// Turns cumulative frame reports into increments.
///
/// The position never moves backwards: a report lower than the best one seen
/// so far yields a zero delta and is otherwise ignored.
#[derive(Debug, Default, Clone)]
pub struct FrameTracker {
    last: u64,
}

impl FrameTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cumulative count and return how far it moved the position
    pub fn observe(&mut self, frame: u64) -> u64 {
        let delta = frame.saturating_sub(self.last);
        if delta > 0 {
            self.last = frame;
        }
        delta
    }

    /// Highest frame count reported so far
    pub fn last(&self) -> u64 {
        self.last
    }
}

/// Per-clip progress: frame tracking plus the terminal bar it drives
pub struct ClipProgress {
    tracker: FrameTracker,
    bar: ProgressBar,
}

impl ClipProgress {
    /// Bar bounded by the clip's declared frame count. A hidden bar still
    /// keeps its position, which the batch uses when the terminal is not
    /// wanted.
    pub fn new(total_frames: u64, label: &str, visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new(total_frames)
        } else {
            let bar = ProgressBar::hidden();
            bar.set_length(total_frames);
            bar
        };

        let style = ProgressStyle::with_template(
            "{msg:>18} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");

        bar.set_style(style);
        bar.set_message(label.to_string());

        Self {
            tracker: FrameTracker::new(),
            bar,
        }
    }

    /// Feed one line of encoder stdout. Returns the delta applied, if the line
    /// was a frame report.
    pub fn handle_line(&mut self, line: &str) -> Option<u64> {
        let frame = parse_frame_line(line)?;
        let delta = self.tracker.observe(frame);
        if delta > 0 {
            // Encoders may report more frames than the manifest declared;
            // the bar simply runs past its length.
            self.bar.inc(delta);
        }
        Some(delta)
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish();
    }

    pub fn abandon(&self) {
        self.bar.abandon();
    }
}
