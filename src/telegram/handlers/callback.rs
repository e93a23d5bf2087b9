//! Quality selection: turn a parked request into a running delivery.

use teloxide::prelude::*;
use teloxide::types::CallbackQuery;

use super::types::{HandlerDeps, HandlerError};
use crate::delivery::DeliveryRequest;
use crate::telegram::Bot;
use crate::telegram::{keyboards, texts};

/// Handles a quality-button press.
///
/// Requires a parked request for the pressing user; the menu message
/// becomes the status message and the pipeline runs in its own task so
/// the dispatcher keeps serving other users.
pub(super) async fn handle_quality_callback(bot: &Bot, q: CallbackQuery, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(data) = q.data.as_deref() else { return Ok(()) };
    let Some(tier) = keyboards::tier_from_callback(data) else {
        // Not one of our buttons
        return Ok(());
    };
    let user_id = i64::try_from(q.from.id.0).unwrap_or(0);

    if deps.sessions.is_in_flight(user_id) {
        bot.answer_callback_query(q.id.clone())
            .text(texts::ALREADY_IN_FLIGHT)
            .show_alert(true)
            .await?;
        return Ok(());
    }

    let Some(pending) = deps.sessions.take_request(user_id).await else {
        log::info!("⌛ user {} pressed a button with no parked request", user_id);
        bot.answer_callback_query(q.id.clone())
            .text(texts::REQUEST_EXPIRED)
            .show_alert(true)
            .await?;
        return Ok(());
    };

    bot.answer_callback_query(q.id.clone()).await?;
    log::info!("🎚 user {} picked {} for {}", user_id, tier.label(), pending.url);

    let request = DeliveryRequest::new(user_id, pending.chat_id, pending.menu_message_id, pending.url, tier);
    let pipeline = deps.pipeline.clone();
    tokio::spawn(async move {
        let outcome = pipeline.deliver(&request).await;
        log::info!("📬 user {} request ended: {}", request.user_id, outcome.kind_label());
    });

    Ok(())
}
