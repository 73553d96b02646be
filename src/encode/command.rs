use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::clip::ClipRecord;
use crate::config::{Config, EncoderConfig};
use crate::encode::filters::{render_chain, VideoFilter};
use crate::encode::preset::EncodingProfile;

/// A fully assembled encoder invocation. Building one never touches the
/// filesystem or spawns anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeInvocation {
    pub program: String,

    /// Kept as OS strings so card and output paths reach ffmpeg byte for byte
    pub args: Vec<OsString>,

    pub output: PathBuf,
}

impl EncodeInvocation {
    /// Shell-like rendering for debug logs
    pub fn display_line(&self) -> String {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().map(|a| a.to_string_lossy().into_owned()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Output name for a source file: every occurrence of the source extension
/// token is replaced, so `C0001.MP4` becomes `C0001_converted.mp4`.
pub fn output_file_name(clip: &ClipRecord, encoder: &EncoderConfig) -> String {
    clip.file_name()
        .replace(&encoder.source_extension, &encoder.converted_suffix)
}

/// Destination path of a clip inside `output_dir`
pub fn destination_path(clip: &ClipRecord, output_dir: &Path, encoder: &EncoderConfig) -> PathBuf {
    output_dir.join(output_file_name(clip, encoder))
}

/// Build the ffmpeg argument list for one clip.
///
/// Progress is requested on stdout (`-progress pipe:1`) so the driver can
/// follow `frame=` lines while the encode runs.
pub fn build_command(
    input: &Path,
    output: &Path,
    filters: &[VideoFilter],
    profile: &EncodingProfile,
    config: &Config,
) -> EncodeInvocation {
    let encoder = &config.encoder;

    let mut args: Vec<OsString> = ["-hide_banner", "-loglevel", "error", "-i"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(input.as_os_str().to_os_string());

    if let Some(chain) = render_chain(filters, &config.overlay) {
        args.push("-vf".into());
        args.push(chain.into());
    }

    let settings = [
        "-c:v".to_string(),
        encoder.video_codec.clone(),
        "-preset".to_string(),
        profile.speed.to_string(),
        "-crf".to_string(),
        profile.crf.to_string(),
        "-c:a".to_string(),
        encoder.audio_codec.clone(),
        "-b:a".to_string(),
        encoder.audio_bitrate.clone(),
        "-progress".to_string(),
        "pipe:1".to_string(),
    ];
    args.extend(settings.into_iter().map(OsString::from));
    args.push(output.as_os_str().to_os_string());

    EncodeInvocation {
        program: encoder.ffmpeg_path.clone(),
        args,
        output: output.to_path_buf(),
    }
}
