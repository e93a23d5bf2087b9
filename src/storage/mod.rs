//! Remote storage fallback providers
//!
//! When a video cannot be delivered inline, it goes to one of these
//! providers and the user gets a link instead. Providers implement the
//! [`Uploader`] capability trait and are tried in a fixed order:
//! the anonymous file host first (no credential, no quota), the
//! authenticated Drive storage second.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::core::config;

pub mod drive;
pub mod gofile;

pub use drive::DriveUploader;
pub use gofile::GofileUploader;

/// Upload errors
///
/// Every failed step surfaces as one of these; there is no
/// partial-success state a caller could observe.
#[derive(Error, Debug)]
pub enum UploadError {
    /// Provider answered but refused the upload
    #[error("{provider} rejected the upload: {reason}")]
    Rejected { provider: &'static str, reason: String },

    /// Transport-level failure talking to the provider
    #[error("HTTP error talking to {provider}: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Provider answered with something we cannot use
    #[error("unexpected response from {provider}: {reason}")]
    BadResponse { provider: &'static str, reason: String },

    /// Could not read the file being uploaded
    #[error("IO error reading upload file: {0}")]
    Io(#[from] std::io::Error),
}

/// A publicly reachable link produced by a successful upload.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Which provider hosts the file
    pub provider: &'static str,
    /// Shareable URL for the user
    pub url: String,
}

/// Capability interface for pushing a local file to a remote host.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Provider name for logs and user-facing labels.
    fn name(&self) -> &'static str;

    /// Uploads the file and returns a public link.
    async fn upload(&self, path: &Path) -> Result<StoredFile, UploadError>;
}

/// Builds the ordered provider chain from the environment.
///
/// The anonymous host is first when enabled; the Drive provider joins
/// only when a credential is configured. An empty chain is legal, the
/// pipeline then reports size-exceeded with the source URL.
pub fn configured_uploaders(client: &reqwest::Client) -> Vec<Arc<dyn Uploader>> {
    let mut uploaders: Vec<Arc<dyn Uploader>> = Vec::new();

    if *config::upload::GOFILE_ENABLED {
        uploaders.push(Arc::new(GofileUploader::new(client.clone())));
    }
    if let Some(drive) = DriveUploader::from_config(client.clone()) {
        uploaders.push(Arc::new(drive));
    }

    uploaders
}
