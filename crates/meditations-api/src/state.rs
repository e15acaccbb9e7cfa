//! Application state shared across handlers.

use std::sync::Arc;

use meditations_core::{AuthSettings, FavoritesService, IdentityService};
use meditations_persistence::{ContentStore, UserStore};
use meditations_telegram::{BotRouter, BotService};

use crate::config::ApiConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Month documents.
    pub content: Arc<ContentStore>,
    /// User records.
    pub users: Arc<UserStore>,
    /// Identity handshake.
    pub identity: Arc<IdentityService>,
    /// Favorites.
    pub favorites: Arc<FavoritesService>,
    /// Bot update handler; `None` when no bot token is configured.
    pub bot: Option<Arc<BotService>>,
}

impl AppState {
    /// Creates a new AppState without a bot.
    pub fn new(
        config: ApiConfig,
        content: ContentStore,
        users: UserStore,
        auth: &AuthSettings,
    ) -> Self {
        let users = Arc::new(users);
        Self {
            config: Arc::new(config),
            content: Arc::new(content),
            identity: Arc::new(IdentityService::from_settings(Arc::clone(&users), auth)),
            favorites: Arc::new(FavoritesService::new(Arc::clone(&users))),
            users,
            bot: None,
        }
    }

    /// Attaches the bot update handler served on the webhook.
    pub fn with_bot(mut self, bot: Arc<BotService>) -> Self {
        self.bot = Some(bot);
        self
    }

    /// A bot router sharing this state's stores and services.
    pub fn bot_router(&self, app_url: impl Into<String>) -> BotRouter {
        BotRouter::new(
            Arc::clone(&self.identity),
            Arc::clone(&self.favorites),
            Arc::clone(&self.content),
            app_url,
        )
    }
}
