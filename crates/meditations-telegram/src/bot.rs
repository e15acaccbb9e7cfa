//! Bot runtime: update dispatch, long polling and webhook setup.

use std::sync::Arc;

use serde_json::Value;
use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, UpdateKind};
use teloxide::utils::command::BotCommands;
use tracing::{debug, info, warn};
use url::Url;

use crate::commands::Command;
use crate::error::{Result, TelegramError};
use crate::inbound::{InboundCallback, InboundMessage};
use crate::router::BotRouter;
use crate::sender::{ReplySender, TeloxideSender};

/// Routes updates and delivers the replies.
pub struct BotService {
    router: BotRouter,
    sender: Arc<dyn ReplySender>,
}

impl BotService {
    pub fn new(router: BotRouter, sender: Arc<dyn ReplySender>) -> Self {
        Self { router, sender }
    }

    /// Handles a chat message.
    pub async fn dispatch_message(&self, msg: &InboundMessage) -> Result<()> {
        debug!(chat_id = msg.chat_id, text = %msg.text, "Message received");
        for reply in self.router.handle_message(msg) {
            self.sender.send(&reply).await?;
        }
        Ok(())
    }

    /// Handles a button press. The query is answered before anything else.
    pub async fn dispatch_callback(&self, callback: &InboundCallback) -> Result<()> {
        if let Err(e) = self.sender.answer_callback(&callback.id).await {
            warn!(callback_id = %callback.id, error = %e, "Failed to answer callback query");
        }
        for reply in self.router.handle_callback(callback) {
            self.sender.send(&reply).await?;
        }
        Ok(())
    }

    /// Handles one Bot API update. Kinds other than messages and callback
    /// queries are ignored.
    pub async fn process_update(&self, update: Update) -> Result<()> {
        match update.kind {
            UpdateKind::Message(msg) => self.dispatch_message(&InboundMessage::from_message(&msg)).await,
            UpdateKind::CallbackQuery(query) => {
                self.dispatch_callback(&InboundCallback::from_query(&query)).await
            }
            other => {
                debug!(kind = ?other, "Ignoring update");
                Ok(())
            }
        }
    }

    /// Handles one update in Bot API JSON form, as posted to the webhook.
    pub async fn process_update_json(&self, update: Value) -> Result<()> {
        let update: Update = serde_json::from_value(update)?;
        self.process_update(update).await
    }
}

/// The Telegram bot for Daily Meditations.
pub struct TelegramBot {
    /// The teloxide bot instance.
    bot: Bot,
    service: Arc<BotService>,
}

impl TelegramBot {
    /// Create a new TelegramBot instance.
    ///
    /// Requires `TELEGRAM_BOT_TOKEN` environment variable to be set.
    pub fn new(router: BotRouter) -> Result<Self> {
        let token = meditations_core::config::bot_token().ok_or(TelegramError::NoToken)?;
        Ok(Self::with_token(&token, router))
    }

    /// Create a TelegramBot for an explicit token.
    pub fn with_token(token: &str, router: BotRouter) -> Self {
        let bot = Bot::new(token);
        let sender = Arc::new(TeloxideSender::new(bot.clone()));
        Self {
            bot,
            service: Arc::new(BotService::new(router, sender)),
        }
    }

    /// The update handler shared by polling and the webhook.
    pub fn service(&self) -> Arc<BotService> {
        Arc::clone(&self.service)
    }

    /// Get the bot's username.
    pub async fn get_me(&self) -> Result<String> {
        let me = self.bot.get_me().await?;
        Ok(me.username().to_string())
    }

    /// Registers `url` as the webhook and publishes the command menu.
    pub async fn setup_webhook(&self, url: &str) -> Result<()> {
        let url = Url::parse(url).map_err(|e| TelegramError::WebhookFailed(e.to_string()))?;

        info!(url = %url, "Setting webhook");
        self.bot
            .set_webhook(url)
            .await
            .map_err(|e| TelegramError::WebhookFailed(e.to_string()))?;

        let info = self.bot.get_webhook_info().await?;
        info!(
            url = ?info.url,
            pending_update_count = info.pending_update_count,
            last_error = ?info.last_error_message,
            "Webhook info"
        );

        self.bot.set_my_commands(Command::bot_commands()).await?;
        info!("Bot commands set");
        Ok(())
    }

    /// Start the bot in polling mode.
    ///
    /// Any webhook must be removed first; Telegram refuses `getUpdates` while
    /// one is set.
    pub async fn start_polling(&self) -> Result<()> {
        info!("Starting Telegram bot in polling mode...");

        self.bot.delete_webhook().await?;

        let service_for_messages = Arc::clone(&self.service);
        let service_for_callbacks = Arc::clone(&self.service);

        let handler = dptree::entry()
            .branch(
                Update::filter_callback_query().endpoint(move |q: CallbackQuery| {
                    let service = Arc::clone(&service_for_callbacks);
                    async move { service.dispatch_callback(&InboundCallback::from_query(&q)).await }
                }),
            )
            .branch(Update::filter_message().endpoint(move |msg: Message| {
                let service = Arc::clone(&service_for_messages);
                async move { service.dispatch_message(&InboundMessage::from_message(&msg)).await }
            }));

        info!("Bot is running! Send /start to begin.");

        Dispatcher::builder(self.bot.clone(), handler)
            .default_handler(|upd| async move {
                debug!("Unhandled update: {:?}", upd);
            })
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }
}
