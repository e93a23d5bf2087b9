//! Kachalka - Telegram bot that downloads videos by link and delivers
//! them inline, compressed, or via a cloud-storage link when the file
//! is too large.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, sessions, URL validation
//! - `fetch`: yt-dlp process adapter and quality tiers
//! - `transcode`: ffmpeg size-targeted compression and remux
//! - `storage`: cloud storage providers used as a fallback chain
//! - `delivery`: the size-tiered delivery pipeline
//! - `telegram`: bot wiring, dispatcher handlers, keyboards, texts

pub mod core;
pub mod delivery;
pub mod fetch;
pub mod storage;
pub mod telegram;
pub mod transcode;

// Re-export commonly used types for convenience
pub use crate::core::error;
pub use crate::core::{AppError, AppResult, config};
pub use crate::delivery::{DeliveryOutcome, DeliveryRequest, MediaTransport, Pipeline, PipelineConfig};
pub use crate::fetch::{FetchedMedia, Fetcher, QualityTier};
pub use crate::storage::{StoredFile, Uploader};
pub use crate::transcode::Transcoder;
