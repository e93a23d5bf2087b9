//! URL validation for user submissions
//!
//! Whitelist-based check that a submitted link points at one of the
//! platforms the bot can actually download from. Everything else is
//! rejected before any session state is created.

use thiserror::Error;
use url::Url;

/// Validation errors
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Invalid URL format or unsupported domain
    #[error("Unsupported link: {0}")]
    UnsupportedUrl(String),
}

/// Domains the bot accepts, matched exactly or as a parent domain.
pub const SUPPORTED_DOMAINS: &[&str] = &[
    "youtube.com",
    "youtu.be",
    "instagram.com",
    "tiktok.com",
    "facebook.com",
    "fb.watch",
];

/// Validates that a URL points at a supported video platform.
///
/// # Security
/// Uses whitelist approach:
/// - Only HTTP/HTTPS schemes allowed
/// - Only the domains in [`SUPPORTED_DOMAINS`] (+ subdomains)
///
/// # Arguments
/// * `url` - The URL string to validate
///
/// # Returns
/// * `Ok(())` if the URL is from a supported platform
/// * `Err(ValidationError)` if invalid
///
/// # Examples
/// ```
/// use kachalka::core::validation::validate_media_url;
///
/// // Valid URLs
/// assert!(validate_media_url("https://youtube.com/watch?v=dQw4w9WgXcQ").is_ok());
/// assert!(validate_media_url("https://youtu.be/dQw4w9WgXcQ").is_ok());
/// assert!(validate_media_url("https://vm.tiktok.com/ZM2JkEjPq/").is_ok());
/// assert!(validate_media_url("https://www.instagram.com/reel/Cx1/").is_ok());
///
/// // Invalid URLs
/// assert!(validate_media_url("https://evil.com/watch?v=dQw4w9WgXcQ").is_err());
/// assert!(validate_media_url("ftp://youtube.com/video").is_err());
/// assert!(validate_media_url("not a url").is_err());
/// ```
pub fn validate_media_url(url: &str) -> Result<(), ValidationError> {
    // Parse URL
    let parsed = Url::parse(url).map_err(|_| ValidationError::UnsupportedUrl(url.to_string()))?;

    // Only HTTP and HTTPS are allowed
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ValidationError::UnsupportedUrl(format!(
            "{} (invalid scheme: {})",
            url,
            parsed.scheme()
        )));
    }

    // Check host against the whitelist
    let host = parsed
        .host_str()
        .ok_or_else(|| ValidationError::UnsupportedUrl(format!("{} (no host)", url)))?;

    let supported = SUPPORTED_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)));

    if !supported {
        return Err(ValidationError::UnsupportedUrl(format!(
            "{} (unsupported domain: {})",
            url, host
        )));
    }

    Ok(())
}
