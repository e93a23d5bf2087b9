use thiserror::Error;

/// Centralized error types for the application
///
/// All errors in the application are converted to this enum for consistent error handling.
/// Uses `thiserror` for automatic error conversion and display formatting.
///
/// # Example
///
/// ```no_run
/// use kachalka::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// Fetch (yt-dlp) errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] crate::fetch::FetchError),

    /// Transcode (ffmpeg) errors
    #[error("Transcode error: {0}")]
    Transcode(#[from] crate::transcode::TranscodeError),

    /// Remote storage errors
    #[error("Upload error: {0}")]
    Upload(#[from] crate::storage::UploadError),

    /// HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Anyhow errors (for general error handling)
    #[error("Application error: {0}")]
    Anyhow(#[from] anyhow::Error),

    /// Validation errors (unsupported or malformed submission)
    #[error("Validation error: {0}")]
    Validation(#[from] crate::core::validation::ValidationError),

    /// Anything unexpected caught at the pipeline boundary
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

/// Helper function to convert String to AppError::Internal
impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Internal(err)
    }
}

/// Helper function to convert &str to AppError::Internal
impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        AppError::Internal(err.to_string())
    }
}
