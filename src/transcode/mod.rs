//! Re-encoding local media with an external transcoder
//!
//! The pipeline depends on the [`Transcoder`] trait; the production
//! implementation shells out to ffmpeg. Failures here are recoverable:
//! the pipeline logs them and falls through to the storage providers,
//! it never aborts the request over a transcode error.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tokio::process::Command;

use crate::core::config;

pub mod ffmpeg;

pub use ffmpeg::FfmpegTranscoder;

/// Transcode errors
#[derive(Error, Debug)]
pub enum TranscodeError {
    /// ffmpeg exited non-zero
    #[error("ffmpeg error: {0}")]
    Ffmpeg(String),

    /// Input file does not exist
    #[error("input file not found: {0}")]
    InputNotFound(String),

    /// ffmpeg exited zero but produced no output file
    #[error("output file was not created: {0}")]
    OutputMissing(String),

    /// Duration probe failed or returned garbage
    #[error("could not probe duration: {0}")]
    Probe(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Result with TranscodeError
pub type TranscodeResult<T> = Result<T, TranscodeError>;

/// Capability interface for re-encoding local media files.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Implementation name for logs.
    fn name(&self) -> &'static str;

    /// Re-encodes `input` into `output` aiming at `target_size_mb`.
    ///
    /// Best effort: the result can still land above the target when the
    /// bitrate floor kicks in. The caller re-checks the output size.
    async fn compress_to_size(&self, input: &Path, output: &Path, target_size_mb: u64) -> TranscodeResult<()>;

    /// Re-encodes `input` into an mp4 at a fixed quality factor, without
    /// a size target. Used to normalize containers before inline send.
    async fn remux_to_mp4(&self, input: &Path, output: &Path) -> TranscodeResult<()>;
}

/// Audio bitrate used for all encodes, and its bits-per-second value
/// reserved out of the size budget.
pub const AUDIO_BITRATE: &str = "128k";
const AUDIO_BITRATE_BPS: u64 = 128_000;

/// Lowest video bitrate worth encoding at. Below this the output is
/// unwatchable mush, so the budget math floors here and the result may
/// exceed the target.
const MIN_VIDEO_BITRATE_BPS: u64 = 500_000;

/// Fraction of the byte budget actually spent, leaving headroom for
/// container overhead.
const SIZE_SAFETY_FACTOR: f64 = 0.95;

/// Computes the video bitrate (bits/sec) that fits `target_size_mb`
/// into `duration_secs`, after reserving the audio allowance.
///
/// Caller guarantees `duration_secs` is finite and positive.
pub fn target_video_bitrate(target_size_mb: u64, duration_secs: f64) -> u64 {
    let total_bits = target_size_mb as f64 * 8_388_608.0 * SIZE_SAFETY_FACTOR;
    let video_bps = total_bits / duration_secs - AUDIO_BITRATE_BPS as f64;
    video_bps.max(MIN_VIDEO_BITRATE_BPS as f64) as u64
}

/// Probes a media file's duration in seconds via ffprobe.
pub async fn probe_duration(path: &Path) -> TranscodeResult<f64> {
    let output = Command::new(config::FFPROBE_BIN.as_str())
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .await
        .map_err(|e| TranscodeError::Probe(format!("failed to run ffprobe: {}", e)))?;

    if !output.status.success() {
        return Err(TranscodeError::Probe(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    let text = String::from_utf8_lossy(&output.stdout);
    let duration: f64 = text
        .trim()
        .parse()
        .map_err(|_| TranscodeError::Probe(format!("non-numeric duration: {}", text.trim())))?;

    if !duration.is_finite() || duration <= 0.0 {
        return Err(TranscodeError::Probe(format!("invalid duration: {}", duration)));
    }

    Ok(duration)
}

/// Returns the first line of `ffmpeg -version`, or None if the binary
/// is missing.
pub async fn ffmpeg_version() -> Option<String> {
    let output = Command::new(config::FFMPEG_BIN.as_str())
        .arg("-version")
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|line| line.trim().to_string())
}
