use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::clip::ClipRecord;
use crate::config::Config;
use crate::encode::command::{build_command, destination_path};
use crate::encode::filters::{build_filter_chain, VideoFilter};
use crate::encode::preset::EncodingProfile;
use crate::encode::progress::ClipProgress;
use crate::encode::runner::EncoderRunner;
use crate::error::{EncodeError, ImportError, Result};

/// Result of one clip within a batch
#[derive(Debug)]
pub enum ClipOutcome {
    Encoded {
        identifier: String,
        output: PathBuf,
    },
    Failed {
        identifier: String,
        source: PathBuf,
        error: ImportError,
    },
}

impl ClipOutcome {
    pub fn identifier(&self) -> &str {
        match self {
            Self::Encoded { identifier, .. } | Self::Failed { identifier, .. } => identifier,
        }
    }

    pub fn output(&self) -> Option<&Path> {
        match self {
            Self::Encoded { output, .. } => Some(output),
            Self::Failed { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Encoded { .. })
    }
}

/// Per-clip outcomes of a batch, in manifest order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<ClipOutcome>,
}

impl BatchReport {
    /// Successfully written files, in clip order
    pub fn outputs(&self) -> Vec<PathBuf> {
        self.outcomes
            .iter()
            .filter_map(|o| o.output().map(Path::to_path_buf))
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ClipOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }
}

/// Drives the external encoder over clip records, one clip at a time
///
/// Each clip is independent: nothing carries over from one encode to the
/// next, and a failure is contained to its clip.
pub struct TranscodeDriver<'a, R: EncoderRunner> {
    config: &'a Config,
    runner: R,
    show_progress: bool,
}

impl<'a, R: EncoderRunner> TranscodeDriver<'a, R> {
    pub fn new(config: &'a Config, runner: R) -> Self {
        Self {
            config,
            runner,
            show_progress: true,
        }
    }

    /// Hide the terminal progress bars
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Encode a single clip into `output_dir`, returning the written path.
    ///
    /// Fails with [`EncodeError::SourceNotFound`] when the essence file is
    /// missing and [`EncodeError::ProcessFailed`] on a non-zero exit. A
    /// partially written output is left in place.
    pub async fn encode_clip(
        &self,
        clip: &ClipRecord,
        output_dir: &Path,
        profile: &EncodingProfile,
        include_timestamp: bool,
    ) -> Result<PathBuf> {
        if !clip.source_path.exists() {
            return Err(EncodeError::SourceNotFound {
                path: clip.source_path.display().to_string(),
            }.into());
        }

        tokio::fs::create_dir_all(output_dir).await?;
        let output = destination_path(clip, output_dir, &self.config.encoder);

        let filters = build_filter_chain(clip, include_timestamp);
        if include_timestamp && clip.capture_timestamp.is_none() {
            debug!("{}: no capture time, skipping timestamp overlay", clip.file_name());
        }
        if filters.iter().any(|f| matches!(f, VideoFilter::TimestampOverlay { .. }))
            && !self.config.overlay.font_path.exists()
        {
            warn!("Overlay font {:?} not found", self.config.overlay.font_path);
        }

        let invocation = build_command(&clip.source_path, &output, &filters, profile, self.config);

        info!("Encoding {} ...", clip.file_name());
        let mut progress = ClipProgress::new(clip.duration_frames, &clip.file_name(), self.show_progress);

        let exit = self
            .runner
            .run(&invocation, &mut |line: &str| {
                progress.handle_line(line);
            })
            .await;

        let exit = match exit {
            Ok(exit) => exit,
            Err(e) => {
                progress.abandon();
                return Err(e);
            }
        };

        if !exit.success {
            progress.abandon();
            return Err(EncodeError::ProcessFailed {
                output: output.display().to_string(),
                code: exit.code,
            }.into());
        }

        progress.finish();
        info!("Finished {}", output.display());
        Ok(output)
    }

    /// Encode every clip in order. Failures are logged and recorded, never
    /// propagated, so the whole batch always runs.
    pub async fn encode_clips(
        &self,
        clips: &[ClipRecord],
        output_dir: &Path,
        profile: &EncodingProfile,
        include_timestamp: bool,
    ) -> BatchReport {
        let mut report = BatchReport::default();

        for clip in clips {
            let outcome = match self.encode_clip(clip, output_dir, profile, include_timestamp).await {
                Ok(output) => ClipOutcome::Encoded {
                    identifier: clip.identifier.clone(),
                    output,
                },
                Err(e) => {
                    error!("Failed to encode {}: {}", clip.source_path.display(), e.user_message());
                    ClipOutcome::Failed {
                        identifier: clip.identifier.clone(),
                        source: clip.source_path.clone(),
                        error: e,
                    }
                }
            };
            report.outcomes.push(outcome);
        }

        info!(
            "Batch complete: {} encoded, {} failed",
            report.success_count(),
            report.failure_count()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::ScanMode;
    use crate::encode::command::EncodeInvocation;
    use crate::encode::preset::QualityPreset;
    use crate::encode::runner::EncoderExit;
    use chrono::NaiveDate;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Replays canned stdout and fails encodes whose output matches
    #[derive(Default)]
    struct ScriptedRunner {
        lines: Vec<String>,
        failing_output: Option<String>,
        calls: Mutex<Vec<EncodeInvocation>>,
    }

    impl EncoderRunner for ScriptedRunner {
        async fn run(
            &self,
            invocation: &EncodeInvocation,
            on_line: &mut dyn FnMut(&str),
        ) -> Result<EncoderExit> {
            self.calls.lock().unwrap().push(invocation.clone());
            for line in &self.lines {
                on_line(line);
            }

            let output = invocation.output.display().to_string();
            match &self.failing_output {
                Some(name) if output.ends_with(name.as_str()) => Ok(EncoderExit::failed(1)),
                _ => Ok(EncoderExit::ok()),
            }
        }
    }

    fn clip_at(path: PathBuf, scan_mode: ScanMode, captured: bool) -> ClipRecord {
        ClipRecord {
            identifier: format!("./Clip/{}", path.file_name().unwrap().to_string_lossy()),
            source_path: path,
            duration_frames: 30,
            frame_rate: 29.97,
            scan_mode,
            aspect_ratio: "16:9".to_string(),
            audio_channels: 2,
            video_essence_type: "AVC_1920_1080_HP@L41".to_string(),
            audio_essence_type: "LPCM16".to_string(),
            capture_timestamp: captured.then(|| {
                NaiveDate::from_ymd_opt(2025, 10, 17)
                    .unwrap()
                    .and_hms_opt(10, 38, 39)
                    .unwrap()
            }),
        }
    }

    fn card_with(names: &[&str]) -> (tempfile::TempDir, Vec<PathBuf>) {
        let dir = tempdir().unwrap();
        let clip_dir = dir.path().join("Clip");
        std::fs::create_dir_all(&clip_dir).unwrap();
        let paths = names
            .iter()
            .map(|name| {
                let path = clip_dir.join(name);
                std::fs::write(&path, b"essence").unwrap();
                path
            })
            .collect();
        (dir, paths)
    }

    #[tokio::test]
    async fn test_batch_isolates_missing_source() {
        let (dir, paths) = card_with(&["C0001.MP4", "C0003.MP4"]);
        let clips = vec![
            clip_at(paths[0].clone(), ScanMode::Progressive, false),
            clip_at(dir.path().join("Clip/C0002.MP4"), ScanMode::Progressive, false),
            clip_at(paths[1].clone(), ScanMode::Progressive, false),
        ];
        let out_dir = dir.path().join("imported");

        let config = Config::default();
        let driver = TranscodeDriver::new(&config, ScriptedRunner::default()).with_progress(false);
        let report = driver
            .encode_clips(&clips, &out_dir, &QualityPreset::High.profile(), false)
            .await;

        assert_eq!(
            report.outputs(),
            vec![out_dir.join("C0001_converted.mp4"), out_dir.join("C0003_converted.mp4")]
        );
        assert_eq!(report.failure_count(), 1);

        let failure = report.failures().next().unwrap();
        assert_eq!(failure.identifier(), "./Clip/C0002.MP4");
        assert!(matches!(
            failure,
            ClipOutcome::Failed { error: ImportError::Encode(EncodeError::SourceNotFound { .. }), .. }
        ));

        // The missing clip never reached the encoder
        assert_eq!(driver.runner().calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_contained() {
        let (dir, paths) = card_with(&["C0001.MP4", "C0002.MP4"]);
        let clips: Vec<ClipRecord> = paths
            .iter()
            .map(|p| clip_at(p.clone(), ScanMode::Progressive, false))
            .collect();
        let out_dir = dir.path().join("imported");

        let config = Config::default();
        let runner = ScriptedRunner {
            failing_output: Some("C0001_converted.mp4".to_string()),
            ..Default::default()
        };
        let driver = TranscodeDriver::new(&config, runner).with_progress(false);
        let report = driver
            .encode_clips(&clips, &out_dir, &QualityPreset::Medium.profile(), false)
            .await;

        assert_eq!(report.outputs(), vec![out_dir.join("C0002_converted.mp4")]);
        assert!(matches!(
            &report.outcomes[0],
            ClipOutcome::Failed {
                error: ImportError::Encode(EncodeError::ProcessFailed { code: Some(1), .. }),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_encode_clip_passes_filters_and_profile() {
        let (dir, paths) = card_with(&["C0001.MP4"]);
        let clip = clip_at(paths[0].clone(), ScanMode::Interlaced, true);
        let out_dir = dir.path().join("imported");

        let config = Config::default();
        let runner = ScriptedRunner {
            lines: ["frame=0", "frame=12", "frame=30", "progress=end"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ..Default::default()
        };
        let driver = TranscodeDriver::new(&config, runner).with_progress(false);
        let output = driver
            .encode_clip(&clip, &out_dir, &QualityPreset::Low.profile(), true)
            .await
            .unwrap();

        assert_eq!(output, out_dir.join("C0001_converted.mp4"));

        let calls = driver.runner().calls.lock().unwrap();
        let args = &calls[0].args;
        let vf = args.iter().position(|a| a == "-vf").unwrap();
        assert!(args[vf + 1].to_string_lossy().starts_with("yadif,drawtext="));
        assert!(args.windows(2).any(|w| w[0] == "-crf" && w[1] == "22"));
        assert_eq!(args.last().map(|a| a.as_os_str()), Some(output.as_os_str()));
    }

    #[tokio::test]
    async fn test_output_dir_creation_is_idempotent() {
        let (dir, paths) = card_with(&["C0001.MP4"]);
        let clip = clip_at(paths[0].clone(), ScanMode::Progressive, false);
        let out_dir = dir.path().join("nested").join("imported");

        let config = Config::default();
        let driver = TranscodeDriver::new(&config, ScriptedRunner::default()).with_progress(false);
        let profile = QualityPreset::High.profile();

        for _ in 0..2 {
            driver.encode_clip(&clip, &out_dir, &profile, false).await.unwrap();
        }
        assert!(out_dir.is_dir());
    }

    #[tokio::test]
    async fn test_missing_source_skips_directory_creation() {
        let dir = tempdir().unwrap();
        let clip = clip_at(dir.path().join("Clip/C0404.MP4"), ScanMode::Progressive, false);
        let out_dir = dir.path().join("imported");

        let config = Config::default();
        let driver = TranscodeDriver::new(&config, ScriptedRunner::default()).with_progress(false);
        let err = driver
            .encode_clip(&clip, &out_dir, &QualityPreset::High.profile(), false)
            .await
            .unwrap_err();

        assert!(err.is_clip_scoped());
        assert!(!out_dir.exists());
    }
}
