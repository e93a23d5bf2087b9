//! Delivery pipeline orchestrator.
//!
//! Turns (URL, quality tier) into exactly one terminal outcome:
//!   fetch → size decision → [remux | compress | upload chain] → send
//!   → cleanup
//! Adapter failures never escape as raw errors; each one either picks
//! the next fallback or becomes a `DeliveryOutcome::Failure` with a
//! human-readable message. Local files created for a request are
//! deleted on every exit path, and the per-user lock is released the
//! same way.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

use crate::core::config;
use crate::core::error::AppError;
use crate::core::session::SessionStore;
use crate::delivery::outcome::DeliveryOutcome;
use crate::delivery::{DeliveryRequest, MediaTransport};
use crate::fetch::{self, FetchRequest, FetchedMedia, Fetcher, MediaKind};
use crate::storage::Uploader;
use crate::telegram::texts;
use crate::transcode::Transcoder;

/// Tunables the pipeline reads once at construction.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Largest file sent inline; anything above goes to compression or
    /// the upload chain.
    pub inline_limit_bytes: u64,
    /// Skip compression and go straight to the upload chain for
    /// oversized files.
    pub prefer_upload_over_transcode: bool,
    /// Cap on diagnostic text shown to the user, in characters.
    pub error_detail_max_chars: usize,
    /// Scratch directory shared with the fetcher.
    pub download_dir: PathBuf,
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        Self {
            inline_limit_bytes: config::delivery::effective_inline_limit_bytes(),
            prefer_upload_over_transcode: *config::delivery::PREFER_UPLOAD_OVER_TRANSCODE,
            error_detail_max_chars: config::delivery::ERROR_DETAIL_MAX_CHARS,
            download_dir: PathBuf::from(config::DOWNLOAD_DIR.as_str()),
        }
    }
}

/// The orchestrator. Holds capability adapters, never spawns processes
/// or talks HTTP itself.
pub struct Pipeline {
    fetcher: Arc<dyn Fetcher>,
    transcoder: Arc<dyn Transcoder>,
    uploaders: Vec<Arc<dyn Uploader>>,
    transport: Arc<dyn MediaTransport>,
    sessions: SessionStore,
    upload_slots: Arc<Semaphore>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        transcoder: Arc<dyn Transcoder>,
        uploaders: Vec<Arc<dyn Uploader>>,
        transport: Arc<dyn MediaTransport>,
        sessions: SessionStore,
        config: PipelineConfig,
    ) -> Self {
        Self {
            fetcher,
            transcoder,
            uploaders,
            transport,
            sessions,
            upload_slots: Arc::new(Semaphore::new(config::upload::MAX_CONCURRENT_UPLOADS)),
            config,
        }
    }

    /// Runs one request end to end and reports what happened.
    ///
    /// Holds the per-user lock for the whole run; a second call for the
    /// same user while one is in flight returns a Failure without
    /// touching the chat (the handler already answered the user).
    pub async fn deliver(&self, request: &DeliveryRequest) -> DeliveryOutcome {
        let Some(_guard) = self.sessions.try_begin(request.user_id) else {
            log::warn!("🔒 user {} already has a request in flight, dropping duplicate", request.user_id);
            return DeliveryOutcome::Failure {
                message: texts::ALREADY_IN_FLIGHT.to_string(),
            };
        };

        let started = Instant::now();
        log::info!(
            "🚚 delivery started for user {}: {} ({})",
            request.user_id,
            request.url,
            request.tier.label()
        );

        let outcome = match self.run(request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("💥 unexpected failure for user {}: {}", request.user_id, e);
                let message = texts::unexpected_error(&e.to_string(), self.config.error_detail_max_chars);
                self.status(request, &message).await;
                DeliveryOutcome::Failure { message }
            }
        };

        self.cleanup(&request.file_prefix).await;

        log::info!(
            "🏁 delivery finished for user {} in {:.1}s: {}",
            request.user_id,
            started.elapsed().as_secs_f64(),
            outcome.kind_label()
        );
        outcome
    }

    /// Decision table proper; everything terminal is rendered here.
    async fn run(&self, request: &DeliveryRequest) -> Result<DeliveryOutcome, AppError> {
        self.status(request, texts::STATUS_FETCHING).await;

        let fetch_request = FetchRequest {
            url: request.url.clone(),
            tier: request.tier,
            file_prefix: request.file_prefix.clone(),
        };
        let media = match self.fetcher.fetch(&fetch_request).await {
            Ok(media) => media,
            Err(e) => {
                log::error!("⬇️ fetch failed for user {}: {}", request.user_id, e);
                let message = fetch::user_message(&e);
                self.status(request, &message).await;
                return Ok(DeliveryOutcome::Failure { message });
            }
        };
        log::info!(
            "⬇️ fetched {} bytes to {} for user {}",
            media.size_bytes,
            media.path.display(),
            request.user_id
        );

        // Audio is never size-gated.
        if media.kind == MediaKind::Audio {
            self.status(request, texts::STATUS_SENDING).await;
            self.transport.send_audio(request.chat_id, &media.path, None).await?;
            self.drop_status(request).await;
            return Ok(DeliveryOutcome::InlineAttachment {
                size_bytes: media.size_bytes,
                compressed_from_bytes: None,
            });
        }

        if media.size_bytes <= self.config.inline_limit_bytes {
            return self.deliver_inline_video(request, &media).await;
        }

        if self.config.prefer_upload_over_transcode {
            log::info!("☁️ upload preferred over transcode, skipping compression");
            return self.deliver_via_upload(request, &media).await;
        }

        self.deliver_compressed(request, &media).await
    }

    /// Artifact fits as-is; remux into mp4 first when the container is
    /// something else, falling back to a document send if remux fails.
    async fn deliver_inline_video(
        &self,
        request: &DeliveryRequest,
        media: &FetchedMedia,
    ) -> Result<DeliveryOutcome, AppError> {
        if !needs_remux(&media.path) {
            self.status(request, texts::STATUS_SENDING).await;
            self.transport.send_video(request.chat_id, &media.path, None).await?;
            self.drop_status(request).await;
            return Ok(DeliveryOutcome::InlineAttachment {
                size_bytes: media.size_bytes,
                compressed_from_bytes: None,
            });
        }

        let remuxed = self.config.download_dir.join(format!("{}_remux.mp4", request.file_prefix));
        let sent_bytes = match self.transcoder.remux_to_mp4(&media.path, &remuxed).await {
            Ok(()) => {
                // The remuxed rendition is what actually goes out.
                let size = tokio::fs::metadata(&remuxed)
                    .await
                    .map(|meta| meta.len())
                    .unwrap_or(media.size_bytes);
                self.status(request, texts::STATUS_SENDING).await;
                self.transport.send_video(request.chat_id, &remuxed, None).await?;
                size
            }
            Err(e) => {
                log::warn!("📦 remux failed ({}), sending original as document", e);
                self.status(request, texts::STATUS_SENDING).await;
                self.transport.send_document(request.chat_id, &media.path, None).await?;
                media.size_bytes
            }
        };
        self.drop_status(request).await;
        Ok(DeliveryOutcome::InlineAttachment {
            size_bytes: sent_bytes,
            compressed_from_bytes: None,
        })
    }

    /// Oversized artifact: compress down to the inline limit, deliver
    /// the result if it fits, otherwise hand over to the upload chain.
    async fn deliver_compressed(
        &self,
        request: &DeliveryRequest,
        media: &FetchedMedia,
    ) -> Result<DeliveryOutcome, AppError> {
        self.status(request, texts::STATUS_COMPRESSING).await;

        let target_mb = self.config.inline_limit_bytes / 1_048_576;
        let compressed = self
            .config
            .download_dir
            .join(format!("{}_compressed.mp4", request.file_prefix));

        if let Err(e) = self
            .transcoder
            .compress_to_size(&media.path, &compressed, target_mb)
            .await
        {
            log::warn!("🗜 compression failed ({}), falling back to upload", e);
            return self.deliver_via_upload(request, media).await;
        }

        match tokio::fs::metadata(&compressed).await {
            Ok(meta) if meta.len() <= self.config.inline_limit_bytes => {
                let caption = texts::compressed_caption(media.size_bytes, meta.len());
                self.status(request, texts::STATUS_SENDING).await;
                self.transport
                    .send_video(request.chat_id, &compressed, Some(&caption))
                    .await?;
                self.drop_status(request).await;
                Ok(DeliveryOutcome::InlineAttachment {
                    size_bytes: meta.len(),
                    compressed_from_bytes: Some(media.size_bytes),
                })
            }
            Ok(meta) => {
                log::info!(
                    "🗜 compressed output still oversized ({} bytes > {} limit), falling back to upload",
                    meta.len(),
                    self.config.inline_limit_bytes
                );
                self.deliver_via_upload(request, media).await
            }
            Err(e) => {
                log::warn!("🗜 compressed output missing ({}), falling back to upload", e);
                self.deliver_via_upload(request, media).await
            }
        }
    }

    /// Walks the provider chain with the original artifact; when every
    /// provider refuses, the user at least gets the source URL back.
    async fn deliver_via_upload(
        &self,
        request: &DeliveryRequest,
        media: &FetchedMedia,
    ) -> Result<DeliveryOutcome, AppError> {
        self.status(request, texts::STATUS_UPLOADING).await;
        let _slot = self.upload_slots.acquire().await.ok();

        for uploader in &self.uploaders {
            match uploader.upload(&media.path).await {
                Ok(stored) => {
                    log::info!("☁️ {} accepted the file for user {}: {}", stored.provider, request.user_id, stored.url);
                    self.transport
                        .edit_status(
                            request.chat_id,
                            request.status_message_id,
                            &texts::remote_link(media.size_bytes, &stored.url),
                        )
                        .await?;
                    return Ok(DeliveryOutcome::RemoteLink {
                        provider: stored.provider,
                        url: stored.url,
                        size_bytes: media.size_bytes,
                    });
                }
                Err(e) => {
                    log::warn!("☁️ {} upload failed: {}", uploader.name(), e);
                }
            }
        }

        let message = texts::size_exceeded(media.size_bytes, &request.url);
        self.status(request, &message).await;
        Ok(DeliveryOutcome::Failure { message })
    }

    /// Best-effort status edit; a broken edit must not kill a delivery.
    async fn status(&self, request: &DeliveryRequest, text: &str) {
        if let Err(e) = self
            .transport
            .edit_status(request.chat_id, request.status_message_id, text)
            .await
        {
            log::warn!("✏️ status edit failed for user {}: {}", request.user_id, e);
        }
    }

    /// Best-effort removal of the status message after an inline send.
    async fn drop_status(&self, request: &DeliveryRequest) {
        if let Err(e) = self
            .transport
            .delete_status(request.chat_id, request.status_message_id)
            .await
        {
            log::warn!("🧹 status delete failed for user {}: {}", request.user_id, e);
        }
    }

    /// Deletes every scratch file carrying the request's prefix.
    /// Failures are logged and swallowed; cleanup never blocks the
    /// lock release or the outcome.
    async fn cleanup(&self, file_prefix: &str) {
        let mut entries = match tokio::fs::read_dir(&self.config.download_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("🧹 cleanup could not read {}: {}", self.config.download_dir.display(), e);
                return;
            }
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !name.starts_with(file_prefix) {
                continue;
            }
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => log::debug!("🧹 removed {}", entry.path().display()),
                Err(e) => log::warn!("🧹 could not remove {}: {}", entry.path().display(), e),
            }
        }
    }
}

/// True when the container is not already mp4.
fn needs_remux(path: &Path) -> bool {
    !path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("mp4"))
        .unwrap_or(false)
}
