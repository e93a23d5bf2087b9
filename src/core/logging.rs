//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - Startup configuration logging (paths, limits, providers, tool versions)

use anyhow::Result;
use simplelog::*;
use std::fs::File;

use crate::core::config;
use crate::fetch::ytdlp_version;
use crate::transcode::ffmpeg_version;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to initialize logger
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the effective configuration at application startup
///
/// Reports:
/// - Download directory and inline delivery limit (standard vs local Bot API)
/// - Which storage providers are configured
/// - yt-dlp / ffmpeg versions, with a warning when a binary is missing
pub async fn log_startup_configuration() {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("⚙️  Startup Configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    log::info!("📁 Download directory: {}", &*config::DOWNLOAD_DIR);

    let limit_mb = config::delivery::effective_inline_limit_bytes() / (1024 * 1024);
    if config::bot_api::is_local() {
        log::info!(
            "📏 Inline limit: {} MB (local Bot API server at {})",
            limit_mb,
            config::bot_api::get_url().unwrap_or_default()
        );
    } else {
        log::info!("📏 Inline limit: {} MB (standard Bot API)", limit_mb);
    }

    if *config::upload::GOFILE_ENABLED {
        log::info!("☁️  Anonymous file host: enabled ({})", &*config::upload::GOFILE_API_BASE);
    } else {
        log::info!("☁️  Anonymous file host: disabled");
    }
    if config::upload::DRIVE_API_TOKEN.is_some() {
        log::info!("☁️  Drive storage: enabled");
    } else {
        log::info!("☁️  Drive storage: disabled (DRIVE_API_TOKEN not set)");
    }

    match ytdlp_version().await {
        Some(version) => log::info!("✅ yt-dlp: {}", version),
        None => log::warn!("⚠️  yt-dlp not found at '{}' - downloads will fail", &*config::YTDL_BIN),
    }
    match ffmpeg_version().await {
        Some(version) => log::info!("✅ ffmpeg: {}", version),
        None => log::warn!(
            "⚠️  ffmpeg not found at '{}' - oversized videos cannot be compressed",
            &*config::FFMPEG_BIN
        ),
    }

    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}
