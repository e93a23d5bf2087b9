//! Size-tiered delivery: decide how fetched media reaches the user.
//!
//! The pipeline consumes capability traits only (`Fetcher`, `Transcoder`,
//! `Uploader`, `MediaTransport`), so the whole decision table runs offline
//! under test doubles. The Telegram-backed `MediaTransport` lives in
//! `crate::telegram::transport`.

pub mod outcome;
pub mod pipeline;

pub use outcome::DeliveryOutcome;
pub use pipeline::{Pipeline, PipelineConfig};

use async_trait::async_trait;
use std::path::Path;
use teloxide::types::{ChatId, MessageId};
use uuid::Uuid;

use crate::core::error::AppResult;
use crate::fetch::QualityTier;

/// Chat-transport surface the pipeline needs.
///
/// One editable status message per request, plus the three attachment
/// kinds. Implementations must not retry forever; a returned error is
/// treated as an unexpected failure at the pipeline boundary.
#[async_trait]
pub trait MediaTransport: Send + Sync {
    /// Rewrites the request's status message in place.
    async fn edit_status(&self, chat_id: ChatId, message_id: MessageId, text: &str) -> AppResult<()>;

    /// Removes the status message (used once media went through inline).
    async fn delete_status(&self, chat_id: ChatId, message_id: MessageId) -> AppResult<()>;

    async fn send_video(&self, chat_id: ChatId, path: &Path, caption: Option<&str>) -> AppResult<()>;

    async fn send_audio(&self, chat_id: ChatId, path: &Path, caption: Option<&str>) -> AppResult<()>;

    async fn send_document(&self, chat_id: ChatId, path: &Path, caption: Option<&str>) -> AppResult<()>;
}

/// Everything the pipeline needs to process one quality selection.
#[derive(Debug, Clone)]
pub struct DeliveryRequest {
    pub user_id: i64,
    pub chat_id: ChatId,
    /// The message that is edited through the stages.
    pub status_message_id: MessageId,
    pub url: String,
    pub tier: QualityTier,
    /// Namespaces every local file of this request; cleanup deletes by it.
    pub file_prefix: String,
}

impl DeliveryRequest {
    pub fn new(user_id: i64, chat_id: ChatId, status_message_id: MessageId, url: String, tier: QualityTier) -> Self {
        let token = Uuid::new_v4().simple().to_string();
        let file_prefix = format!("{}_{}", user_id, &token[..8]);
        Self {
            user_id,
            chat_id,
            status_message_id,
            url,
            tier,
            file_prefix,
        }
    }
}
