//! ffmpeg-backed transcoder
//!
//! Two operations: a size-targeted re-encode for oversized videos and a
//! fixed-quality remux into mp4 for inline delivery. Both run ffmpeg
//! with quiet output and report its stderr on failure.

use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

use crate::core::config;
use crate::transcode::{
    AUDIO_BITRATE, TranscodeError, TranscodeResult, Transcoder, probe_duration, target_video_bitrate,
};

/// Encoder preset for all encodes. `fast` keeps multi-gigabyte inputs
/// from taking hours while staying close enough to the size target.
const PRESET: &str = "fast";

/// Quality factor for the container remux (no size target).
const REMUX_CRF: &str = "23";

pub struct FfmpegTranscoder {
    bin: String,
}

impl FfmpegTranscoder {
    pub fn new() -> Self {
        Self {
            bin: config::FFMPEG_BIN.clone(),
        }
    }

    fn compress_args(input: &Path, output: &Path, video_bps: u64) -> Vec<String> {
        let bufsize = video_bps * 2;
        vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-y".into(),
            "-i".into(),
            input.to_string_lossy().into_owned(),
            "-c:v".into(),
            "libx264".into(),
            "-preset".into(),
            PRESET.into(),
            "-b:v".into(),
            video_bps.to_string(),
            "-maxrate".into(),
            video_bps.to_string(),
            "-bufsize".into(),
            bufsize.to_string(),
            "-c:a".into(),
            "aac".into(),
            "-b:a".into(),
            AUDIO_BITRATE.into(),
            "-movflags".into(),
            "+faststart".into(),
            output.to_string_lossy().into_owned(),
        ]
    }

    fn remux_args(input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-y".into(),
            "-i".into(),
            input.to_string_lossy().into_owned(),
            "-c:v".into(),
            "libx264".into(),
            "-preset".into(),
            PRESET.into(),
            "-crf".into(),
            REMUX_CRF.into(),
            "-c:a".into(),
            "aac".into(),
            "-b:a".into(),
            AUDIO_BITRATE.into(),
            "-movflags".into(),
            "+faststart".into(),
            output.to_string_lossy().into_owned(),
        ]
    }

    async fn run(&self, args: &[String], output: &Path) -> TranscodeResult<()> {
        let result = Command::new(&self.bin).args(args).output().await?;

        if !result.status.success() {
            return Err(TranscodeError::Ffmpeg(
                String::from_utf8_lossy(&result.stderr).trim().to_string(),
            ));
        }
        if !output.exists() {
            return Err(TranscodeError::OutputMissing(output.display().to_string()));
        }
        Ok(())
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    async fn compress_to_size(&self, input: &Path, output: &Path, target_size_mb: u64) -> TranscodeResult<()> {
        if !input.exists() {
            return Err(TranscodeError::InputNotFound(input.display().to_string()));
        }

        let duration = probe_duration(input).await?;
        let video_bps = target_video_bitrate(target_size_mb, duration);

        log::info!(
            "🗜 Compressing {} ({:.0}s) to ~{} MB at {} kbps video",
            input.display(),
            duration,
            target_size_mb,
            video_bps / 1000
        );

        self.run(&Self::compress_args(input, output, video_bps), output).await
    }

    async fn remux_to_mp4(&self, input: &Path, output: &Path) -> TranscodeResult<()> {
        if !input.exists() {
            return Err(TranscodeError::InputNotFound(input.display().to_string()));
        }

        log::info!("📦 Remuxing {} into mp4", input.display());
        self.run(&Self::remux_args(input, output), output).await
    }
}
