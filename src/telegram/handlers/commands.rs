//! Command handler implementations (/start, /help)

use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::HandlerError;
use crate::core::config;
use crate::telegram::Bot;
use crate::telegram::texts;

fn inline_limit_mb() -> u64 {
    config::delivery::effective_inline_limit_bytes() / 1_048_576
}

/// Handle /start command
pub(super) async fn handle_start_command(bot: &Bot, msg: &Message) -> Result<(), HandlerError> {
    bot.send_message(msg.chat.id, texts::start_text(inline_limit_mb())).await?;
    Ok(())
}

/// Handle /help command
pub(super) async fn handle_help_command(bot: &Bot, msg: &Message) -> Result<(), HandlerError> {
    bot.send_message(msg.chat.id, texts::help_text(inline_limit_mb())).await?;
    Ok(())
}
