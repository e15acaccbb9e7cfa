//! Outbound seam to the Bot API.

use async_trait::async_trait;
use teloxide::prelude::*;

use crate::error::Result;
use crate::router::BotReply;

/// Delivers replies to Telegram.
#[async_trait]
pub trait ReplySender: Send + Sync {
    /// Sends one reply message.
    async fn send(&self, reply: &BotReply) -> Result<()>;

    /// Acknowledges a button press so the client stops its spinner.
    async fn answer_callback(&self, callback_id: &str) -> Result<()>;
}

/// [`ReplySender`] backed by a teloxide [`Bot`].
#[derive(Clone)]
pub struct TeloxideSender {
    bot: Bot,
}

impl TeloxideSender {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ReplySender for TeloxideSender {
    async fn send(&self, reply: &BotReply) -> Result<()> {
        let mut req = self.bot.send_message(ChatId(reply.chat_id), &reply.text);
        if let Some(keyboard) = &reply.keyboard {
            req = req.reply_markup(keyboard.clone());
        }
        req.await?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<()> {
        self.bot.answer_callback_query(callback_id).await?;
        Ok(())
    }
}
