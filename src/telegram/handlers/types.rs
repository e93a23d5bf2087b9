//! Handler types and shared dependencies

use std::sync::Arc;

use teloxide::prelude::*;

use crate::core::session::SessionStore;
use crate::delivery::Pipeline;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub pipeline: Arc<Pipeline>,
    pub sessions: SessionStore,
    pub bot_username: Option<String>,
    pub bot_id: UserId,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(pipeline: Arc<Pipeline>, sessions: SessionStore, bot_username: Option<String>, bot_id: UserId) -> Self {
        Self {
            pipeline,
            sessions,
            bot_username,
            bot_id,
        }
    }
}
