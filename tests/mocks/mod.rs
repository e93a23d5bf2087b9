//! Mock implementations of the delivery capability traits
//!
//! This module provides in-memory stand-ins for the fetcher, transcoder,
//! storage providers and chat transport, so the delivery decision table
//! can be exercised without yt-dlp, ffmpeg or network access.

pub mod mock_pipeline;

pub use mock_pipeline::{MockFetcher, MockTranscoder, MockUploader, RecordingTransport, TransportEvent};
