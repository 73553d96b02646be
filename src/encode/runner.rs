use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::encode::command::EncodeInvocation;
use crate::error::{EncodeError, Result};

/// Exit information of a finished encoder process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderExit {
    pub success: bool,

    /// Exit code, `None` when the process was terminated by a signal
    pub code: Option<i32>,
}

impl EncoderExit {
    pub fn ok() -> Self {
        Self { success: true, code: Some(0) }
    }

    pub fn failed(code: i32) -> Self {
        Self { success: false, code: Some(code) }
    }
}

impl From<std::process::ExitStatus> for EncoderExit {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
        }
    }
}

/// Executes an encoder invocation, handing every stdout line to `on_line`
/// as it arrives.
///
/// The transcode driver is generic over this so command construction and
/// batch handling can be exercised without spawning ffmpeg.
#[allow(async_fn_in_trait)]
pub trait EncoderRunner {
    async fn run(
        &self,
        invocation: &EncodeInvocation,
        on_line: &mut dyn FnMut(&str),
    ) -> Result<EncoderExit>;
}

/// Runs the real ffmpeg binary as a child process
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    /// Check that `program -version` runs
    pub async fn check_available(program: &str) -> Result<()> {
        let status = Command::new(program)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(EncodeError::ToolUnavailable { program: program.to_string() }.into()),
        }
    }
}

impl EncoderRunner for ProcessRunner {
    async fn run(
        &self,
        invocation: &EncodeInvocation,
        on_line: &mut dyn FnMut(&str),
    ) -> Result<EncoderExit> {
        debug!("Running {}", invocation.display_line());

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| EncodeError::SpawnFailed {
                program: invocation.program.clone(),
                reason: e.to_string(),
            })?;

        let streamed = match child.stdout.take() {
            Some(stdout) => stream_lines(stdout, on_line).await,
            None => Ok(()),
        };

        if let Err(e) = streamed {
            // Never leave the encoder running once its clip is reported
            if let Err(kill_err) = child.kill().await {
                warn!("Could not stop {}: {}", invocation.program, kill_err);
            }
            return Err(e.into());
        }

        let status = child.wait().await?;
        Ok(status.into())
    }
}

/// Hand every newline-terminated line of `reader` to `on_line`. Bytes that
/// are not UTF-8 are replaced rather than treated as a read failure.
async fn stream_lines<T: AsyncRead + Unpin>(
    reader: T,
    on_line: &mut dyn FnMut(&str),
) -> std::io::Result<()> {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(());
        }

        let line = String::from_utf8_lossy(&buf);
        on_line(line.trim_end_matches(['\r', '\n']));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_constructors() {
        assert_eq!(EncoderExit::ok(), EncoderExit { success: true, code: Some(0) });
        assert_eq!(EncoderExit::failed(3), EncoderExit { success: false, code: Some(3) });
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let err = ProcessRunner::check_available("definitely-not-an-encoder-binary")
            .await
            .unwrap_err();
        assert!(!err.is_clip_scoped());
    }

    #[tokio::test]
    async fn test_spawn_failure_is_reported() {
        let invocation = EncodeInvocation {
            program: "definitely-not-an-encoder-binary".to_string(),
            args: vec!["-version".into()],
            output: "out.mp4".into(),
        };

        let mut seen = 0;
        let err = ProcessRunner::new()
            .run(&invocation, &mut |_| seen += 1)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            crate::error::ImportError::Encode(EncodeError::SpawnFailed { .. })
        ));
        assert_eq!(seen, 0);
    }

    #[cfg(unix)]
    fn shell(script: &str) -> EncodeInvocation {
        EncodeInvocation {
            program: "sh".to_string(),
            args: vec!["-c".into(), script.into()],
            output: "out.mp4".into(),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_streams_stdout_and_reports_exit_code() {
        let invocation = shell("echo frame=5; echo fps=1; echo frame=9; exit 3");

        let mut lines = Vec::new();
        let exit = ProcessRunner::new()
            .run(&invocation, &mut |line| lines.push(line.to_string()))
            .await
            .unwrap();

        assert_eq!(lines, vec!["frame=5", "fps=1", "frame=9"]);
        assert_eq!(exit, EncoderExit { success: false, code: Some(3) });
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_exit() {
        let exit = ProcessRunner::new()
            .run(&shell("echo progress=end"), &mut |_| {})
            .await
            .unwrap();
        assert_eq!(exit, EncoderExit::ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_signal_exit_has_no_code() {
        let exit = ProcessRunner::new()
            .run(&shell("kill -9 $$"), &mut |_| {})
            .await
            .unwrap();
        assert_eq!(exit, EncoderExit { success: false, code: None });
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_invalid_utf8_output_waits_for_the_encoder() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("finished");
        let script = format!(
            "printf 'frame=1\\n\\377\\nframe=2\\n'; sleep 1; touch '{}'",
            marker.display()
        );

        let mut lines = Vec::new();
        let exit = ProcessRunner::new()
            .run(&shell(&script), &mut |line| lines.push(line.to_string()))
            .await
            .unwrap();

        assert_eq!(exit, EncoderExit::ok());
        assert!(marker.exists(), "encoder must have finished before run returns");
        assert_eq!(lines, vec!["frame=1", "\u{FFFD}", "frame=2"]);
    }

    #[tokio::test]
    async fn test_stream_lines_handles_crlf_and_missing_newline() {
        let input: &[u8] = b"frame=1\r\nframe=2\nframe=3";
        let mut lines = Vec::new();
        stream_lines(input, &mut |line| lines.push(line.to_string()))
            .await
            .unwrap();
        assert_eq!(lines, vec!["frame=1", "frame=2", "frame=3"]);
    }
}
