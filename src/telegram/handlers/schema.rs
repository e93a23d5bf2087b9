//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::callback::handle_quality_callback;
use super::commands::{handle_help_command, handle_start_command};
use super::message::handle_url_message;
use super::types::{HandlerDeps, HandlerError};
use crate::telegram::Bot;
use crate::telegram::bot::{Command, is_message_addressed_to_bot};

/// Creates the main dispatcher schema for the bot.
///
/// This function returns a handler tree that can be used with teloxide's
/// Dispatcher. The same schema is used in production and in tests.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_messages = deps.clone();
    let deps_callback = deps.clone();

    dptree::entry()
        // Command handler
        .branch(command_handler())
        // Message handler for submitted URLs
        .branch(message_handler(deps_messages))
        // Callback query handler for the quality menu
        .branch(callback_handler(deps_callback))
}

/// Handler for bot commands (/start, /help)
fn command_handler() -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        |bot: Bot, msg: Message, cmd: Command| async move {
            log::info!("🎯 Received command: {:?} from chat {}", cmd, msg.chat.id);

            match cmd {
                Command::Start => handle_start_command(&bot, &msg).await?,
                Command::Help => handle_help_command(&bot, &msg).await?,
            }
            Ok(())
        },
    ))
}

/// Handler for regular messages (URL submissions)
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let bot_username = deps.bot_username.clone();
    let bot_id = deps.bot_id;

    Update::filter_message()
        .filter(move |msg: Message| is_message_addressed_to_bot(&msg, bot_username.as_deref(), bot_id))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = handle_url_message(&bot, &msg, &deps).await {
                    log::error!("❌ message handler failed for chat {}: {}", msg.chat.id, e);
                }
                Ok(())
            }
        })
}

/// Handler for callback queries (quality menu buttons)
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            if let Err(e) = handle_quality_callback(&bot, q, &deps).await {
                log::error!("❌ callback handler failed: {}", e);
            }
            Ok(())
        }
    })
}
