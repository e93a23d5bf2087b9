//! Telegram bot handler tree configuration
//!
//! This module provides the main dispatcher schema for the bot.
//! The handlers are organized in a testable way, allowing integration
//! tests to use the same handler tree as production code.

mod callback;
mod commands;
mod message;
mod schema;
mod types;

pub use schema::schema;
pub use types::{HandlerDeps, HandlerError};
