//! yt-dlp process adapter
//!
//! Spawns yt-dlp with a request-scoped output template, keeps a bounded
//! tail of its stderr for error classification, enforces a wall-clock
//! timeout, and locates the produced file afterwards (the tool
//! substitutes its own title/extension into the template).

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::core::config;
use crate::fetch::{
    FetchError, FetchRequest, FetchedMedia, Fetcher, MediaKind, classify_fetch_error, format_selector, override_for,
};

/// Returns the yt-dlp version string, or None if the binary is missing.
pub async fn ytdlp_version() -> Option<String> {
    let output = Command::new(config::YTDL_BIN.as_str())
        .arg("--version")
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if version.is_empty() { None } else { Some(version) }
}

/// Fetcher backed by the yt-dlp binary.
pub struct YtDlpFetcher {
    bin: String,
    download_dir: PathBuf,
    timeout: Duration,
}

impl YtDlpFetcher {
    pub fn new(download_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self::with_bin(config::YTDL_BIN.clone(), download_dir, timeout)
    }

    /// Points the adapter at a specific downloader binary.
    pub fn with_bin(bin: impl Into<String>, download_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            bin: bin.into(),
            download_dir: download_dir.into(),
            timeout,
        }
    }

    /// Builds the adapter from the environment configuration.
    pub fn from_config() -> Self {
        Self::new(config::DOWNLOAD_DIR.as_str(), config::fetch::timeout())
    }

    fn build_args(&self, request: &FetchRequest, output_template: &str) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-o".into(),
            output_template.into(),
            "--newline".into(),
            "--force-overwrites".into(),
            "--no-playlist".into(),
            "--format".into(),
            format_selector(request.tier).into(),
            "--socket-timeout".into(),
            config::fetch::SOCKET_TIMEOUT_SECS.to_string(),
            "--no-check-certificate".into(),
        ];

        if !request.tier.is_audio() {
            args.push("--merge-output-format".into());
            args.push("mp4".into());
            args.push("--postprocessor-args".into());
            args.push("Merger:-movflags +faststart".into());
        }

        if let Some(platform) = override_for(&request.url) {
            args.push("--user-agent".into());
            args.push(platform.user_agent.into());
        }

        args.push(request.url.clone());
        args
    }
}

#[async_trait]
impl Fetcher for YtDlpFetcher {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedMedia, FetchError> {
        let output_template = self
            .download_dir
            .join(format!("{}_%(title)s.%(ext)s", request.file_prefix));
        let args = self.build_args(request, &output_template.to_string_lossy());

        log::debug!("yt-dlp command: {} {}", self.bin, args.join(" "));

        let mut child = Command::new(&self.bin)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| FetchError::Spawn {
                bin: self.bin.clone(),
                source: e,
            })?;

        // Bounded stderr tail for classification after a failure
        let stderr_tail = Arc::new(Mutex::new(VecDeque::<String>::new()));
        let reader_handle = child.stderr.take().map(|stderr| {
            let tail = Arc::clone(&stderr_tail);
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    log::debug!("yt-dlp stderr: {}", line);
                    if let Ok(mut tail) = tail.lock() {
                        tail.push_back(line);
                        if tail.len() > config::fetch::STDERR_TAIL_LINES {
                            tail.pop_front();
                        }
                    }
                }
            })
        });

        let status = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => return Err(FetchError::Unknown(format!("downloader process failed: {}", e))),
            Err(_) => {
                let _ = child.kill().await;
                log::warn!(
                    "yt-dlp exceeded {}s for {}, killed",
                    self.timeout.as_secs(),
                    request.url
                );
                return Err(FetchError::TimedOut(self.timeout.as_secs()));
            }
        };

        // Process exited, stderr is at EOF; wait for the tail to settle
        if let Some(handle) = reader_handle {
            let _ = handle.await;
        }

        if !status.success() {
            let stderr_text = stderr_tail
                .lock()
                .map(|mut tail| tail.make_contiguous().join("\n"))
                .unwrap_or_default();
            let error = classify_fetch_error(&stderr_text);
            log::error!("yt-dlp exited with {} for {}: {}", status, request.url, error);
            return Err(error);
        }

        let path = find_fetched_file(&self.download_dir, &request.file_prefix)
            .ok_or_else(|| FetchError::MissingOutput(request.file_prefix.clone()))?;
        let size_bytes = std::fs::metadata(&path)
            .map(|m| m.len())
            .map_err(|e| FetchError::Unknown(format!("cannot stat {}: {}", path.display(), e)))?;
        let kind = if request.tier.is_audio() {
            MediaKind::Audio
        } else {
            MediaKind::Video
        };

        log::info!("✅ Fetched {} ({} bytes)", path.display(), size_bytes);
        Ok(FetchedMedia {
            path,
            size_bytes,
            kind,
        })
    }
}

/// Temp suffixes yt-dlp leaves around mid-download.
const TEMP_SUFFIXES: &[&str] = &[".part", ".ytdl", ".temp"];

/// Locates the file a fetch produced by scanning the download directory
/// for the request prefix. The exact name is not predictable because the
/// template substitutes the video title and extension. When merge steps
/// leave several matches, the largest one is the final artifact.
pub fn find_fetched_file(dir: &Path, prefix: &str) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;

    let mut best: Option<(u64, PathBuf)> = None;
    for entry in entries.flatten() {
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();
        if !name.starts_with(prefix) {
            continue;
        }
        if TEMP_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            continue;
        }
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        if best.as_ref().map(|(s, _)| size > *s).unwrap_or(true) {
            best = Some((size, entry.path()));
        }
    }

    best.map(|(_, path)| path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::QualityTier;

    fn request(url: &str, tier: QualityTier) -> FetchRequest {
        FetchRequest {
            url: url.to_string(),
            tier,
            file_prefix: "100_deadbeef".to_string(),
        }
    }

    fn fetcher() -> YtDlpFetcher {
        YtDlpFetcher::new("/tmp/test-downloads", Duration::from_secs(300))
    }

    #[test]
    fn test_build_args_video_tier() {
        let args = fetcher().build_args(&request("https://youtu.be/abc", QualityTier::P720), "out.%(ext)s");

        assert!(args.contains(&"--no-playlist".to_string()));
        assert!(args.contains(&"--merge-output-format".to_string()));
        assert!(args.contains(&"Merger:-movflags +faststart".to_string()));
        assert!(args.iter().any(|a| a.contains("height<=720")));
        // URL comes last
        assert_eq!(args.last().unwrap(), "https://youtu.be/abc");
    }

    #[test]
    fn test_build_args_audio_tier_skips_merge() {
        let args = fetcher().build_args(&request("https://youtu.be/abc", QualityTier::Audio), "out.%(ext)s");

        assert!(!args.contains(&"--merge-output-format".to_string()));
        assert!(!args.iter().any(|a| a.contains("faststart")));
        assert!(args.iter().any(|a| a.starts_with("bestaudio")));
    }

    #[test]
    fn test_build_args_platform_user_agent() {
        let with_override = fetcher().build_args(
            &request("https://www.tiktok.com/@u/video/1", QualityTier::Best),
            "out.%(ext)s",
        );
        assert!(with_override.contains(&"--user-agent".to_string()));

        let without = fetcher().build_args(&request("https://youtu.be/abc", QualityTier::Best), "out.%(ext)s");
        assert!(!without.contains(&"--user-agent".to_string()));
    }

    #[test]
    fn test_find_fetched_file_picks_final_artifact() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("100_deadbeef_Title.mp4"), vec![0u8; 100]).unwrap();
        std::fs::write(dir.path().join("100_deadbeef_Title.f137.mp4.part"), vec![0u8; 500]).unwrap();
        std::fs::write(dir.path().join("other_file.mp4"), vec![0u8; 900]).unwrap();

        let found = find_fetched_file(dir.path(), "100_deadbeef").unwrap();
        assert!(found.to_string_lossy().ends_with("100_deadbeef_Title.mp4"));
    }

    #[test]
    fn test_find_fetched_file_prefers_largest_match() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("100_deadbeef_Title.f251.m4a"), vec![0u8; 100]).unwrap();
        std::fs::write(dir.path().join("100_deadbeef_Title.mp4"), vec![0u8; 5000]).unwrap();

        let found = find_fetched_file(dir.path(), "100_deadbeef").unwrap();
        assert!(found.to_string_lossy().ends_with("100_deadbeef_Title.mp4"));
    }

    #[tokio::test]
    async fn test_expired_deadline_kills_the_downloader() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let stub = dir.path().join("stalling-downloader.sh");
        std::fs::write(&stub, "#!/bin/sh\nsleep 30\n").unwrap();
        let mut perms = std::fs::metadata(&stub).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&stub, perms).unwrap();

        let downloads = dir.path().join("scratch");
        std::fs::create_dir(&downloads).unwrap();
        let fetcher = YtDlpFetcher::with_bin(
            stub.to_string_lossy().into_owned(),
            &downloads,
            Duration::from_millis(50),
        );

        let err = fetcher
            .fetch(&request("https://youtu.be/abc", QualityTier::Best))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::TimedOut(_)));
        // Nothing with the request prefix is left for later steps.
        assert!(find_fetched_file(&downloads, "100_deadbeef").is_none());
    }

    #[test]
    fn test_find_fetched_file_none_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_fetched_file(dir.path(), "100_deadbeef").is_none());
    }
}
