//! Daily Meditations entry point.
//!
//! ```bash
//! daily-meditations serve --port 3000
//! TELEGRAM_BOT_TOKEN=xxx daily-meditations bot poll
//! ```

use clap::Parser;
use meditations_core::config;
use tracing_subscriber::EnvFilter;

use daily_meditations::{execute, Cli};

#[tokio::main]
async fn main() {
    config::load_env();

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(cli.log_filter()))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = config::ensure_all_dirs() {
        tracing::warn!(error = %e, "Failed to create all directories");
    }

    if let Err(e) = execute(cli.command).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
