//! Telegram-facing layer: bot setup, dispatcher handlers, keyboards and
//! user-visible texts.

pub mod bot;
pub mod handlers;
pub mod keyboards;
pub mod texts;
pub mod transport;

/// Bot type used across the handlers.
pub type Bot = teloxide::Bot;

// Re-exports for convenience
pub use bot::{Command, create_bot, is_message_addressed_to_bot, setup_bot_commands};
pub use handlers::{HandlerDeps, HandlerError, schema};
pub use transport::TelegramTransport;
