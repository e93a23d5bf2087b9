//! Fetching remote media through an external downloader
//!
//! The pipeline talks to a [`Fetcher`] capability trait; the production
//! implementation shells out to yt-dlp. Quality tiers map to format
//! selector expressions in [`selectors`], failures are classified in
//! [`errors`].

use async_trait::async_trait;
use std::path::PathBuf;

pub mod errors;
pub mod selectors;
pub mod ytdlp;

pub use errors::{FetchError, classify_fetch_error, user_message};
pub use selectors::{format_selector, override_for};
pub use ytdlp::{YtDlpFetcher, ytdlp_version};

/// Coarse quality selection offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualityTier {
    /// Audio-only, best available audio stream
    Audio,
    /// Video capped at 360p
    P360,
    /// Video capped at 720p
    P720,
    /// Video capped at 1080p
    P1080,
    /// Best available video+audio without a height cap
    Best,
}

impl QualityTier {
    /// True for the audio-only tier.
    pub fn is_audio(self) -> bool {
        matches!(self, QualityTier::Audio)
    }

    /// Short human-readable label used in status messages.
    pub fn label(self) -> &'static str {
        match self {
            QualityTier::Audio => "аудио",
            QualityTier::P360 => "360p",
            QualityTier::P720 => "720p",
            QualityTier::P1080 => "1080p",
            QualityTier::Best => "лучшее",
        }
    }
}

/// What kind of media a fetch produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
}

/// One fetch invocation.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Source URL as submitted by the user
    pub url: String,
    /// Requested quality tier
    pub tier: QualityTier,
    /// Request-scoped file name prefix, unique per invocation.
    /// Everything matching it in the download directory belongs to this
    /// request and is deleted during cleanup.
    pub file_prefix: String,
}

/// A successfully fetched local file.
#[derive(Debug, Clone)]
pub struct FetchedMedia {
    /// Where the downloader put the file
    pub path: PathBuf,
    /// On-disk size
    pub size_bytes: u64,
    /// Audio or video, derived from the requested tier
    pub kind: MediaKind,
}

/// Capability interface for retrieving a remote resource into local
/// storage. Implementations own process/timeout details; the pipeline
/// only sees the result.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Implementation name for logs.
    fn name(&self) -> &'static str;

    /// Downloads `request.url` at the requested tier into the scratch
    /// directory, naming the file with `request.file_prefix`.
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedMedia, FetchError>;
}
