use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// ffmpeg binary path
/// Read from FFMPEG_BIN environment variable
/// Default: ffmpeg (resolved via PATH)
pub static FFMPEG_BIN: Lazy<String> = Lazy::new(|| env::var("FFMPEG_BIN").unwrap_or_else(|_| "ffmpeg".to_string()));

/// ffprobe binary path
/// Read from FFPROBE_BIN environment variable
/// Default: ffprobe (resolved via PATH)
pub static FFPROBE_BIN: Lazy<String> =
    Lazy::new(|| env::var("FFPROBE_BIN").unwrap_or_else(|_| "ffprobe".to_string()));

/// Download scratch directory
/// Read from DOWNLOAD_DIR environment variable
/// Supports tilde (~) expansion for home directory
/// Default: downloads (relative to the working directory)
pub static DOWNLOAD_DIR: Lazy<String> = Lazy::new(|| {
    let raw = env::var("DOWNLOAD_DIR").unwrap_or_else(|_| "downloads".to_string());
    shellexpand::tilde(&raw).into_owned()
});

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: kachalka.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "kachalka.log".to_string()));

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Fetch (yt-dlp) configuration
pub mod fetch {
    use super::{Duration, Lazy, env};

    /// Timeout for a single fetch invocation (in seconds)
    /// Read from FETCH_TIMEOUT_SECS environment variable
    /// Default: 300, hard-capped at HARD_TIMEOUT_CAP_SECS
    pub static TIMEOUT_SECS: Lazy<u64> = Lazy::new(|| {
        env::var("FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300)
            .min(HARD_TIMEOUT_CAP_SECS)
    });

    /// Upper bound on the fetch timeout no matter what the environment says
    pub const HARD_TIMEOUT_CAP_SECS: u64 = 600;

    /// Socket timeout passed to yt-dlp (in seconds)
    pub const SOCKET_TIMEOUT_SECS: u64 = 30;

    /// How many trailing stderr lines to keep for error classification
    pub const STDERR_TAIL_LINES: usize = 200;

    /// Fetch timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(*TIMEOUT_SECS)
    }
}

/// Delivery policy configuration
pub mod delivery {
    use super::{Lazy, env};

    /// Inline delivery limit against the standard Bot API (in megabytes)
    /// Read from INLINE_LIMIT_MB environment variable
    /// Default: 45 (just under the 50 MB Bot API cap)
    pub static INLINE_LIMIT_MB: Lazy<u64> = Lazy::new(|| {
        env::var("INLINE_LIMIT_MB")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(45)
    });

    /// Inline delivery limit when a local Bot API server is configured (in megabytes)
    /// Local servers accept uploads up to 2 GB
    pub const LOCAL_API_INLINE_LIMIT_MB: u64 = 2000;

    /// Skip the compression step for oversized files and go straight to
    /// the storage providers
    /// Read from PREFER_UPLOAD_OVER_TRANSCODE environment variable
    /// Default: false (compress first, upload only if that fails)
    pub static PREFER_UPLOAD_OVER_TRANSCODE: Lazy<bool> = Lazy::new(|| {
        env::var("PREFER_UPLOAD_OVER_TRANSCODE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(false)
    });

    /// Maximum length of diagnostic text shown to the user
    pub const ERROR_DETAIL_MAX_CHARS: usize = 200;

    /// Effective inline limit in bytes for the active Bot API endpoint.
    ///
    /// Standard Bot API (api.telegram.org): INLINE_LIMIT_MB.
    /// Local Bot API server: LOCAL_API_INLINE_LIMIT_MB, detected via
    /// BOT_API_URL the same way as `bot_api::is_local`.
    pub fn effective_inline_limit_bytes() -> u64 {
        if super::bot_api::is_local() {
            LOCAL_API_INLINE_LIMIT_MB * 1024 * 1024
        } else {
            *INLINE_LIMIT_MB * 1024 * 1024
        }
    }
}

/// Remote storage configuration
pub mod upload {
    use super::{Lazy, env};

    /// Worker pool size for blocking storage uploads
    pub const MAX_CONCURRENT_UPLOADS: usize = 3;

    /// Base URL of the anonymous file host API
    /// Read from GOFILE_API_BASE environment variable (tests point this
    /// at a local server)
    pub static GOFILE_API_BASE: Lazy<String> =
        Lazy::new(|| env::var("GOFILE_API_BASE").unwrap_or_else(|_| "https://api.gofile.io".to_string()));

    /// Enable the anonymous file host provider
    /// Read from GOFILE_ENABLED environment variable
    /// Default: true
    pub static GOFILE_ENABLED: Lazy<bool> = Lazy::new(|| {
        env::var("GOFILE_ENABLED")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(true)
    });

    /// Fixed upload host for the anonymous file host
    /// Read from GOFILE_UPLOAD_BASE environment variable
    /// Default: unset, the host comes from the server assignment call
    pub static GOFILE_UPLOAD_BASE: Lazy<Option<String>> = Lazy::new(|| {
        env::var("GOFILE_UPLOAD_BASE")
            .ok()
            .and_then(|s| if s.trim().is_empty() { None } else { Some(s) })
    });

    /// Base URL of the Drive API
    /// Read from DRIVE_API_BASE environment variable
    pub static DRIVE_API_BASE: Lazy<String> = Lazy::new(|| {
        env::var("DRIVE_API_BASE").unwrap_or_else(|_| "https://www.googleapis.com/drive/v3".to_string())
    });

    /// Base URL of the Drive upload endpoint
    /// Read from DRIVE_UPLOAD_BASE environment variable
    pub static DRIVE_UPLOAD_BASE: Lazy<String> = Lazy::new(|| {
        env::var("DRIVE_UPLOAD_BASE")
            .unwrap_or_else(|_| "https://www.googleapis.com/upload/drive/v3".to_string())
    });

    /// Service credential for the Drive provider
    /// Read from DRIVE_API_TOKEN environment variable
    /// The provider is disabled when unset
    pub static DRIVE_API_TOKEN: Lazy<Option<String>> = Lazy::new(|| {
        env::var("DRIVE_API_TOKEN")
            .ok()
            .and_then(|s| if s.trim().is_empty() { None } else { Some(s) })
    });
}

/// Session configuration
pub mod session {
    use super::Duration;

    /// How long a pending request (URL waiting for a quality pick) stays
    /// valid (in seconds)
    pub const REQUEST_TTL_SECS: u64 = 600; // 10 minutes

    /// Request TTL duration
    pub fn request_ttl() -> Duration {
        Duration::from_secs(REQUEST_TTL_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for HTTP requests (in seconds)
    /// Increased to 15 minutes for large file uploads (especially videos via local Bot API)
    pub const REQUEST_TIMEOUT_SECS: u64 = 900; // 15 minutes

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Retry configuration
pub mod retry {
    use super::Duration;

    /// Maximum number of retries for dispatcher reconnection
    pub const MAX_DISPATCHER_RETRIES: u32 = 5;

    /// Base for exponential backoff calculation
    pub const EXPONENTIAL_BACKOFF_BASE: u64 = 2;

    /// Maximum attempts for the startup get_me probe while the Bot API
    /// server warms up
    pub const GET_ME_MAX_ATTEMPTS: u32 = 60;

    /// Delay between get_me attempts (in seconds)
    pub const GET_ME_DELAY_SECS: u64 = 5;

    /// get_me retry delay duration
    pub fn get_me_delay() -> Duration {
        Duration::from_secs(GET_ME_DELAY_SECS)
    }
}

/// Bot API server configuration utilities
///
/// Standard Bot API caps bot uploads at 50 MB; a local Bot API server
/// raises that to 2 GB, which changes the inline-delivery decision.
pub mod bot_api {
    /// Returns the BOT_API_URL environment variable if set.
    pub fn get_url() -> Option<String> {
        std::env::var("BOT_API_URL").ok()
    }

    /// Returns true if using a local Bot API server (not api.telegram.org).
    ///
    /// Checks if BOT_API_URL is set and doesn't point to api.telegram.org.
    pub fn is_local() -> bool {
        get_url().map(|url| !url.contains("api.telegram.org")).unwrap_or(false)
    }
}
