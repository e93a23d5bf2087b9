//! Configurable doubles for the four pipeline capability traits
//!
//! Each double is planned up front and counts what the pipeline asked of
//! it. The fetcher and transcoder write real (tiny) files into the test
//! scratch directory, because the pipeline stats compressed output and
//! sweeps the directory by prefix during cleanup.

#![allow(dead_code)] // Not every helper is used by every test binary

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use teloxide::types::{ChatId, MessageId};

use kachalka::core::error::{AppError, AppResult};
use kachalka::delivery::MediaTransport;
use kachalka::fetch::{FetchError, FetchRequest, FetchedMedia, Fetcher, MediaKind, classify_fetch_error};
use kachalka::storage::{StoredFile, UploadError, Uploader};
use kachalka::transcode::{TranscodeError, TranscodeResult, Transcoder};

enum FetchPlan {
    /// Write a small real file and claim `size_bytes` for it.
    Succeed { size_bytes: u64, extension: &'static str },
    /// Fail with whatever category this stderr classifies into.
    Fail { stderr: &'static str },
}

/// Fetcher double. The claimed size drives the pipeline's size decision,
/// so a few bytes on disk can impersonate a 2 GB download.
pub struct MockFetcher {
    download_dir: PathBuf,
    plan: FetchPlan,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockFetcher {
    pub fn succeeding(download_dir: &Path, size_bytes: u64) -> Self {
        Self {
            download_dir: download_dir.to_path_buf(),
            plan: FetchPlan::Succeed {
                size_bytes,
                extension: "mp4",
            },
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(download_dir: &Path, stderr: &'static str) -> Self {
        Self {
            download_dir: download_dir.to_path_buf(),
            plan: FetchPlan::Fail { stderr },
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Claim a different container, e.g. "webm" to force the remux path.
    pub fn with_extension(mut self, extension: &'static str) -> Self {
        if let FetchPlan::Succeed { extension: ext, .. } = &mut self.plan {
            *ext = extension;
        }
        self
    }

    /// Stall the fetch, keeping the per-user lock held for the duration.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    fn name(&self) -> &'static str {
        "mock-fetcher"
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedMedia, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.plan {
            FetchPlan::Fail { stderr } => Err(classify_fetch_error(stderr)),
            FetchPlan::Succeed { size_bytes, extension } => {
                let extension = if request.tier.is_audio() { "mp3" } else { extension };
                let path = self
                    .download_dir
                    .join(format!("{}_media.{}", request.file_prefix, extension));
                tokio::fs::write(&path, b"mock media payload")
                    .await
                    .map_err(|e| FetchError::Unknown(format!("mock write failed: {}", e)))?;

                let kind = if request.tier.is_audio() {
                    MediaKind::Audio
                } else {
                    MediaKind::Video
                };
                Ok(FetchedMedia {
                    path,
                    size_bytes: *size_bytes,
                    kind,
                })
            }
        }
    }
}

#[derive(Clone, Copy)]
enum TranscodePlan {
    /// Write `output_len` real bytes to the requested output path.
    Produce { output_len: usize },
    Fail,
    /// Report success without writing any output.
    Vanish,
}

/// Transcoder double. Produced output is real so the pipeline's
/// post-compression size check sees an honest file length.
pub struct MockTranscoder {
    plan: TranscodePlan,
    compress_calls: AtomicUsize,
    remux_calls: AtomicUsize,
}

impl MockTranscoder {
    pub fn producing(output_len: usize) -> Self {
        Self {
            plan: TranscodePlan::Produce { output_len },
            compress_calls: AtomicUsize::new(0),
            remux_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            plan: TranscodePlan::Fail,
            compress_calls: AtomicUsize::new(0),
            remux_calls: AtomicUsize::new(0),
        }
    }

    pub fn vanishing() -> Self {
        Self {
            plan: TranscodePlan::Vanish,
            compress_calls: AtomicUsize::new(0),
            remux_calls: AtomicUsize::new(0),
        }
    }

    pub fn compress_calls(&self) -> usize {
        self.compress_calls.load(Ordering::SeqCst)
    }

    pub fn remux_calls(&self) -> usize {
        self.remux_calls.load(Ordering::SeqCst)
    }

    async fn run_plan(&self, output: &Path) -> TranscodeResult<()> {
        match self.plan {
            TranscodePlan::Produce { output_len } => {
                tokio::fs::write(output, vec![0u8; output_len]).await?;
                Ok(())
            }
            TranscodePlan::Fail => Err(TranscodeError::Ffmpeg("mock encoder refused the job".to_string())),
            TranscodePlan::Vanish => Ok(()),
        }
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    fn name(&self) -> &'static str {
        "mock-transcoder"
    }

    async fn compress_to_size(&self, _input: &Path, output: &Path, _target_size_mb: u64) -> TranscodeResult<()> {
        self.compress_calls.fetch_add(1, Ordering::SeqCst);
        self.run_plan(output).await
    }

    async fn remux_to_mp4(&self, _input: &Path, output: &Path) -> TranscodeResult<()> {
        self.remux_calls.fetch_add(1, Ordering::SeqCst);
        self.run_plan(output).await
    }
}

enum UploadPlan {
    Accept { url: String },
    Refuse,
}

/// Storage provider double.
pub struct MockUploader {
    provider: &'static str,
    plan: UploadPlan,
    calls: AtomicUsize,
}

impl MockUploader {
    pub fn accepting(provider: &'static str, url: &str) -> Self {
        Self {
            provider,
            plan: UploadPlan::Accept { url: url.to_string() },
            calls: AtomicUsize::new(0),
        }
    }

    pub fn refusing(provider: &'static str) -> Self {
        Self {
            provider,
            plan: UploadPlan::Refuse,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Uploader for MockUploader {
    fn name(&self) -> &'static str {
        self.provider
    }

    async fn upload(&self, _path: &Path) -> Result<StoredFile, UploadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.plan {
            UploadPlan::Accept { url } => Ok(StoredFile {
                provider: self.provider,
                url: url.clone(),
            }),
            UploadPlan::Refuse => Err(UploadError::Rejected {
                provider: self.provider,
                reason: "mock provider refused the file".to_string(),
            }),
        }
    }
}

/// Everything the pipeline did to the chat, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    EditStatus { text: String },
    DeleteStatus,
    SendVideo { file_name: String, caption: Option<String> },
    SendAudio { file_name: String },
    SendDocument { file_name: String },
}

/// Transport double that records every call. Failure injection is
/// all-or-nothing per call family: edits (including the status delete)
/// or media sends.
pub struct RecordingTransport {
    events: Mutex<Vec<TransportEvent>>,
    fail_edits: bool,
    fail_sends: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail_edits: false,
            fail_sends: false,
        }
    }

    /// Every status edit and delete errors out; sends still work.
    pub fn failing_edits() -> Self {
        Self {
            fail_edits: true,
            ..Self::new()
        }
    }

    /// Every media send errors out; status edits still work.
    pub fn failing_sends() -> Self {
        Self {
            fail_sends: true,
            ..Self::new()
        }
    }

    pub fn events(&self) -> Vec<TransportEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Status texts in the order they were written.
    pub fn edits(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                TransportEvent::EditStatus { text } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn last_edit(&self) -> Option<String> {
        self.edits().pop()
    }

    pub fn deleted_status(&self) -> bool {
        self.events().contains(&TransportEvent::DeleteStatus)
    }

    fn record(&self, event: TransportEvent) {
        self.events.lock().unwrap().push(event);
    }

    fn file_name(path: &Path) -> String {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[async_trait]
impl MediaTransport for RecordingTransport {
    async fn edit_status(&self, _chat_id: ChatId, _message_id: MessageId, text: &str) -> AppResult<()> {
        if self.fail_edits {
            return Err(AppError::Internal("mock transport refused the edit".to_string()));
        }
        self.record(TransportEvent::EditStatus { text: text.to_string() });
        Ok(())
    }

    async fn delete_status(&self, _chat_id: ChatId, _message_id: MessageId) -> AppResult<()> {
        if self.fail_edits {
            return Err(AppError::Internal("mock transport refused the delete".to_string()));
        }
        self.record(TransportEvent::DeleteStatus);
        Ok(())
    }

    async fn send_video(&self, _chat_id: ChatId, path: &Path, caption: Option<&str>) -> AppResult<()> {
        if self.fail_sends {
            return Err(AppError::Internal("mock transport refused the send".to_string()));
        }
        self.record(TransportEvent::SendVideo {
            file_name: Self::file_name(path),
            caption: caption.map(str::to_string),
        });
        Ok(())
    }

    async fn send_audio(&self, _chat_id: ChatId, path: &Path, _caption: Option<&str>) -> AppResult<()> {
        if self.fail_sends {
            return Err(AppError::Internal("mock transport refused the send".to_string()));
        }
        self.record(TransportEvent::SendAudio {
            file_name: Self::file_name(path),
        });
        Ok(())
    }

    async fn send_document(&self, _chat_id: ChatId, path: &Path, _caption: Option<&str>) -> AppResult<()> {
        if self.fail_sends {
            return Err(AppError::Internal("mock transport refused the send".to_string()));
        }
        self.record(TransportEvent::SendDocument {
            file_name: Self::file_name(path),
        });
        Ok(())
    }
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::new()
    }
}
