//! Telegram-backed [`MediaTransport`].
//!
//! Thin adapter from the pipeline's transport trait onto teloxide calls.
//! Everything interesting (retries, fallbacks, message lifecycle) lives
//! on the pipeline side; this stays a one-call-per-method wrapper.

use async_trait::async_trait;
use std::path::Path;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, MessageId};

use crate::core::error::AppResult;
use crate::delivery::MediaTransport;
use crate::telegram::Bot;

pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MediaTransport for TelegramTransport {
    async fn edit_status(&self, chat_id: ChatId, message_id: MessageId, text: &str) -> AppResult<()> {
        self.bot.edit_message_text(chat_id, message_id, text).await?;
        Ok(())
    }

    async fn delete_status(&self, chat_id: ChatId, message_id: MessageId) -> AppResult<()> {
        self.bot.delete_message(chat_id, message_id).await?;
        Ok(())
    }

    async fn send_video(&self, chat_id: ChatId, path: &Path, caption: Option<&str>) -> AppResult<()> {
        let mut request = self
            .bot
            .send_video(chat_id, InputFile::file(path))
            .supports_streaming(true);
        if let Some(caption) = caption {
            request = request.caption(caption.to_string());
        }
        request.await?;
        Ok(())
    }

    async fn send_audio(&self, chat_id: ChatId, path: &Path, caption: Option<&str>) -> AppResult<()> {
        let mut request = self.bot.send_audio(chat_id, InputFile::file(path));
        if let Some(caption) = caption {
            request = request.caption(caption.to_string());
        }
        request.await?;
        Ok(())
    }

    async fn send_document(&self, chat_id: ChatId, path: &Path, caption: Option<&str>) -> AppResult<()> {
        let mut request = self.bot.send_document(chat_id, InputFile::file(path));
        if let Some(caption) = caption {
            request = request.caption(caption.to_string());
        }
        request.await?;
        Ok(())
    }
}
