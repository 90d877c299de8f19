use crate::error::{ProcessingError, ProcessingResult};
use crate::traits::MediaToolkit;
use crate::video::probe::parse_probe_output;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tempfile::TempPath;
use tokio::process::Command;
use tubely_core::ProbeResult;

/// Validate a binary path doesn't contain shell metacharacters
fn validate_path(path: &str) -> Result<()> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.is_empty() || path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(anyhow!("Path contains dangerous characters: {}", path));
    }
    Ok(())
}

/// [`MediaToolkit`] backed by the ffprobe and ffmpeg binaries.
///
/// Child processes are killed when the calling future is dropped, so a cancelled
/// request never leaves a probe or remux running.
#[derive(Debug, Clone)]
pub struct FfmpegToolkit {
    ffprobe_path: String,
    ffmpeg_path: String,
}

impl FfmpegToolkit {
    pub fn new(ffprobe_path: String, ffmpeg_path: String) -> Result<Self> {
        validate_path(&ffprobe_path)?;
        validate_path(&ffmpeg_path)?;
        Ok(Self {
            ffprobe_path,
            ffmpeg_path,
        })
    }

    fn probe_args(path: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-v", "error", "-print_format", "json", "-show_streams"]
            .iter()
            .map(OsString::from)
            .collect();
        args.push(path.as_os_str().to_owned());
        args
    }

    fn fast_start_args(input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-y".into(), "-v".into(), "error".into(), "-i".into()];
        args.push(input.as_os_str().to_owned());
        args.extend(
            ["-c", "copy", "-movflags", "+faststart", "-f", "mp4"]
                .iter()
                .map(OsString::from),
        );
        args.push(output.as_os_str().to_owned());
        args
    }
}

#[async_trait]
impl MediaToolkit for FfmpegToolkit {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
    ))]
    async fn probe(&self, path: &Path) -> ProcessingResult<ProbeResult> {
        let start = std::time::Instant::now();

        let output = Command::new(&self.ffprobe_path)
            .args(Self::probe_args(path))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ProcessingError::Spawn {
                tool: "ffprobe",
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProcessingError::Probe(format!(
                "ffprobe exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let result = parse_probe_output(&output.stdout)?;

        tracing::debug!(
            width = result.width,
            height = result.height,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Probed video geometry"
        );

        Ok(result)
    }

    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
    ))]
    async fn fast_start(&self, path: &Path) -> ProcessingResult<TempPath> {
        let start = std::time::Instant::now();
        let dir = path.parent().unwrap_or_else(|| Path::new("."));

        // Owned before ffmpeg runs so a failed or cancelled remux still removes it
        let output_path = tempfile::Builder::new()
            .prefix("tubely-faststart-")
            .suffix(".mp4")
            .tempfile_in(dir)?
            .into_temp_path();

        let output = Command::new(&self.ffmpeg_path)
            .args(Self::fast_start_args(path, &output_path))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ProcessingError::Spawn {
                tool: "ffmpeg",
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProcessingError::Remux(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        tracing::debug!(
            output = %output_path.display(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Remuxed video for fast start"
        );

        Ok(output_path)
    }
}
