//! Bot initialization and message routing utilities
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Message addressing logic (private chats, mentions, replies)

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::types::{ChatKind, Message, MessageEntityKind, UserId};
use teloxide::utils::command::BotCommands;

use crate::core::config;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Я умею:")]
pub enum Command {
    #[command(description = "показать приветствие и что я умею")]
    Start,
    #[command(description = "как пользоваться ботом")]
    Help,
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Failed to create bot (missing token, invalid URL)
pub fn create_bot() -> anyhow::Result<Bot> {
    let token = config::BOT_TOKEN.as_str();
    if token.is_empty() {
        anyhow::bail!("BOT_TOKEN is not set");
    }

    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(token, client);

    // Check if local Bot API server is configured
    let bot = if let Some(bot_api_url) = config::bot_api::get_url() {
        log::info!("Using custom Bot API URL: {}", bot_api_url);
        let url = url::Url::parse(&bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
        bot.set_api_url(url)
    } else {
        bot
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    use teloxide::types::BotCommand;

    bot.set_my_commands(vec![
        BotCommand::new("start", "показать приветствие и что я умею"),
        BotCommand::new("help", "как пользоваться ботом"),
    ])
    .await?;

    Ok(())
}

/// Checks if a message is addressed to the bot
///
/// # Returns
/// * `true` if message is addressed to bot (private chat, bot mention, reply to bot message)
/// * `false` otherwise
pub fn is_message_addressed_to_bot(msg: &Message, bot_username: Option<&str>, bot_id: UserId) -> bool {
    // In private chats, all messages are addressed to the bot
    if matches!(msg.chat.kind, ChatKind::Private(_)) {
        return true;
    }

    // Check if the message is a reply to a bot message
    if let Some(reply_to) = msg.reply_to_message() {
        if let Some(from) = &reply_to.from {
            if from.id == bot_id {
                return true;
            }
        }
    }

    // Check message text for bot mention
    if let Some(text) = msg.text() {
        if let Some(entities) = msg.entities() {
            for entity in entities {
                if matches!(entity.kind, MessageEntityKind::Mention) {
                    let Some(mention) = entity_slice(text, entity.offset, entity.length) else {
                        continue;
                    };
                    let mention_username = mention.strip_prefix('@').unwrap_or(mention);
                    if let Some(username) = bot_username {
                        if mention_username.eq_ignore_ascii_case(username) {
                            return true;
                        }
                    }
                }
            }
        }

        if let Some(username) = bot_username {
            let mention_pattern = format!("@{}", username);
            if text.contains(&mention_pattern) {
                return true;
            }
        }
    }

    false
}

/// Byte position of a UTF-16 code-unit offset. Telegram entity
/// coordinates count UTF-16 code units, not bytes, so slicing the text
/// directly panics on anything non-ASCII before the entity.
fn utf16_offset_to_byte(text: &str, offset: usize) -> Option<usize> {
    let mut units = 0;
    for (pos, ch) in text.char_indices() {
        if units == offset {
            return Some(pos);
        }
        units += ch.len_utf16();
    }
    // Offset may point exactly at the end of the text; anything past it
    // (or inside a surrogate pair) is a malformed entity.
    (units == offset).then_some(text.len())
}

/// Slices `text` by Telegram entity coordinates; None for entities
/// that do not map onto the text.
fn entity_slice(text: &str, offset: usize, length: usize) -> Option<&str> {
    let start = utf16_offset_to_byte(text, offset)?;
    let end = utf16_offset_to_byte(text, offset + length)?;
    text.get(start..end)
}
