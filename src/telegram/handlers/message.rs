//! URL intake: validate the link and offer the quality menu.

use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{HandlerDeps, HandlerError};
use crate::core::session::PendingRequest;
use crate::core::validation::validate_media_url;
use crate::telegram::Bot;
use crate::telegram::{keyboards, texts};

/// Handles a plain text message: a supported URL opens the quality
/// menu and parks the request; anything else gets a short rejection.
///
/// A new URL from the same user supersedes any parked one; the menu of
/// the old request stays behind but its buttons will report "resubmit".
pub(super) async fn handle_url_message(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(text) = msg.text() else { return Ok(()) };
    let url = text.trim();
    let Some(user) = msg.from.as_ref() else { return Ok(()) };
    let user_id = i64::try_from(user.id.0).unwrap_or(0);

    if let Err(e) = validate_media_url(url) {
        log::info!("🚫 rejected link from user {}: {}", user_id, e);
        bot.send_message(msg.chat.id, texts::UNSUPPORTED_LINK).await?;
        return Ok(());
    }

    let menu = bot
        .send_message(msg.chat.id, texts::QUALITY_PROMPT)
        .reply_markup(keyboards::quality_keyboard())
        .await?;

    deps.sessions
        .store_request(user_id, PendingRequest::new(url.to_string(), msg.chat.id, menu.id))
        .await;
    log::info!("🔗 user {} submitted {}", user_id, url);

    Ok(())
}
