use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use tokio::time::sleep;

use kachalka::core::session::SessionStore;
use kachalka::core::{config, init_logger, log_startup_configuration};
use kachalka::delivery::{Pipeline, PipelineConfig};
use kachalka::fetch::YtDlpFetcher;
use kachalka::storage::configured_uploaders;
use kachalka::telegram::{HandlerDeps, TelegramTransport, create_bot, schema, setup_bot_commands};
use kachalka::transcode::FfmpegTranscoder;

/// Main entry point for the Telegram bot
///
/// # Errors
/// Returns an error if initialization fails (logging, bot creation,
/// scratch directory).
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present
    let _ = dotenv();

    // Set up global panic handler to catch panics in dispatcher
    // This allows us to log the panic and continue working instead of terminating
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    run_bot().await
}

/// Run the Telegram bot
async fn run_bot() -> Result<()> {
    let bot_init_start = std::time::Instant::now();
    log::info!("Starting bot...");

    log_startup_configuration().await;

    // Scratch directory for fetched media
    tokio::fs::create_dir_all(config::DOWNLOAD_DIR.as_str()).await?;

    let bot = create_bot()?;

    // Get bot information to check mentions
    // Retry while a local Bot API server is still initializing
    let bot_info = {
        let mut attempt = 0;
        loop {
            match bot.get_me().await {
                Ok(info) => break info,
                Err(e) => {
                    let err_str = e.to_string();
                    let is_retryable = err_str.contains("restart")
                        || err_str.contains("network")
                        || err_str.contains("connection")
                        || err_str.contains("timed out")
                        || err_str.contains("Connection refused");

                    attempt += 1;
                    if attempt >= config::retry::GET_ME_MAX_ATTEMPTS || !is_retryable {
                        return Err(anyhow::anyhow!(
                            "Failed to connect to Bot API after {} attempts: {}",
                            attempt,
                            e
                        ));
                    }

                    log::warn!(
                        "Bot API not ready (attempt {}/{}): {}. Retrying in {} seconds...",
                        attempt,
                        config::retry::GET_ME_MAX_ATTEMPTS,
                        err_str,
                        config::retry::GET_ME_DELAY_SECS
                    );
                    sleep(config::retry::get_me_delay()).await;
                }
            }
        }
    };
    let bot_username = bot_info.username.clone();
    let bot_id = bot_info.id;
    log::info!("Bot username: {:?}, Bot ID: {}", bot_username, bot_id);

    setup_bot_commands(&bot).await?;

    // Shared HTTP client for the storage providers
    let http = reqwest::Client::builder().timeout(config::network::timeout()).build()?;

    let sessions = SessionStore::new();
    let pipeline = Arc::new(Pipeline::new(
        Arc::new(YtDlpFetcher::from_config()),
        Arc::new(FfmpegTranscoder::default()),
        configured_uploaders(&http),
        Arc::new(TelegramTransport::new(bot.clone())),
        sessions.clone(),
        PipelineConfig::from_env(),
    ));

    let handler_deps = HandlerDeps::new(pipeline, sessions, bot_username, bot_id);
    let handler = schema(handler_deps);

    let init_elapsed = bot_init_start.elapsed();
    log::info!("================================================");
    log::info!("🎉 Bot initialization complete in {:.2}s", init_elapsed.as_secs_f64());
    log::info!("📡 Ready to receive updates!");
    log::info!("================================================");

    // Run the dispatcher with retry logic
    let mut retry_count = 0;
    let max_retries = config::retry::MAX_DISPATCHER_RETRIES;

    loop {
        let bot_clone = bot.clone();
        let handler_clone = handler.clone();

        // Create a new dispatcher in a separate task to isolate panics
        // "TX is dead" panics will be caught via the JoinHandle
        let handle = tokio::spawn(async move {
            use teloxide::update_listeners::Polling;

            // Create polling listener that drops pending updates on start
            let listener = Polling::builder(bot_clone.clone()).drop_pending_updates().build();

            Dispatcher::builder(bot_clone, handler_clone)
                .dependencies(DependencyMap::new())
                .enable_ctrlc_handler()
                .build()
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await
        });

        match handle.await {
            Ok(()) => {
                // Dispatcher finished normally
                log::info!("Dispatcher shutdown gracefully");
                break;
            }
            Err(join_err) => {
                // Task was cancelled or panicked
                if join_err.is_panic() {
                    let panic_msg = join_err.to_string();
                    log::error!("Dispatcher panicked: {}", panic_msg);

                    if panic_msg.contains("TX is dead") || panic_msg.contains("SendError") {
                        log::warn!("Detected TX is dead panic - will reconnect...");
                    }

                    if retry_count < max_retries {
                        retry_count += 1;
                        log::info!(
                            "Retrying dispatcher connection after panic (attempt {}/{})...",
                            retry_count,
                            max_retries
                        );
                        sleep(backoff_delay(retry_count)).await;
                    } else {
                        log::error!("Max retries reached after panic. Exiting...");
                        break;
                    }
                } else {
                    log::warn!("Dispatcher task was cancelled: {}", join_err);
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Exponential backoff delay for dispatcher retries
fn backoff_delay(retry_count: u32) -> Duration {
    Duration::from_secs(config::retry::EXPONENTIAL_BACKOFF_BASE.pow(retry_count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_delay_doubles() {
        assert_eq!(backoff_delay(1), Duration::from_secs(2));
        assert_eq!(backoff_delay(2), Duration::from_secs(4));
        assert_eq!(backoff_delay(3), Duration::from_secs(8));
        assert_eq!(backoff_delay(5), Duration::from_secs(32));
    }
}
