//! Command execution.

use meditations_api::{serve, ApiConfig, AppState};
use meditations_core::{config, AuthSettings};
use meditations_persistence::{ContentStore, UserStore};
use meditations_telegram::{TelegramBot, TelegramError};
use thiserror::Error;
use tracing::{info, warn};

use crate::cli::{BotCommands, Commands};

/// Errors surfaced to the user by the binary.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),

    #[error(transparent)]
    Telegram(#[from] TelegramError),
}

fn build_state(api: ApiConfig) -> AppState {
    AppState::new(
        api,
        ContentStore::new(config::content_dir()),
        UserStore::new(config::state_dir()),
        &AuthSettings::from_env(),
    )
}

/// Runs one subcommand to completion.
pub async fn execute(command: Commands) -> Result<(), RunError> {
    match command {
        Commands::Serve {
            host,
            port,
            cors_origin,
        } => {
            let api = ApiConfig::new(host, port).with_cors_origins(cors_origin);
            run_server(api).await
        }
        Commands::Bot { command } => run_bot(command).await,
    }
}

async fn run_server(api: ApiConfig) -> Result<(), RunError> {
    let mut state = build_state(api.clone());

    match config::bot_token() {
        Some(token) => {
            let bot = TelegramBot::with_token(&token, state.bot_router(config::app_url()));
            state = state.with_bot(bot.service());
            info!("Telegram webhook enabled");
        }
        None => warn!("TELEGRAM_BOT_TOKEN not set; webhook will answer 503"),
    }

    info!(
        content_dir = %config::content_dir().display(),
        state_dir = %config::state_dir().display(),
        "Starting server"
    );
    serve(api, state).await?;
    Ok(())
}

async fn run_bot(command: BotCommands) -> Result<(), RunError> {
    let state = build_state(ApiConfig::default());
    let bot = TelegramBot::new(state.bot_router(config::app_url()))?;

    let username = bot.get_me().await?;
    info!(username = %username, "Bot initialized");

    match command {
        BotCommands::Poll => {
            println!("\nDaily Meditations bot @{} (polling)", username);
            println!("   Press Ctrl+C to stop\n");
            bot.start_polling().await?;
        }
        BotCommands::Setup { webhook_url } => {
            bot.setup_webhook(&webhook_url).await?;
            println!("Webhook set to {}", webhook_url);
        }
    }
    Ok(())
}
