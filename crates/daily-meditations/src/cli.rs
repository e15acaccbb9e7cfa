//! Command-line interface definition using clap.

use clap::{Parser, Subcommand};

/// Daily Meditations - content server and Telegram bot
#[derive(Parser, Debug)]
#[command(name = "daily-meditations")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server (content admin, identity, favorites, webhook)
    Serve {
        /// Address to bind
        #[arg(long, env = "MEDITATIONS_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, env = "MEDITATIONS_PORT", default_value_t = meditations_api::DEFAULT_PORT)]
        port: u16,

        /// Allowed CORS origins (comma separated; any origin when omitted)
        #[arg(long, env = "MEDITATIONS_CORS_ORIGINS", value_delimiter = ',')]
        cors_origin: Vec<String>,
    },

    /// Telegram bot commands
    Bot {
        #[command(subcommand)]
        command: BotCommands,
    },
}

/// Bot subcommands.
#[derive(Subcommand, Debug)]
pub enum BotCommands {
    /// Receive updates by long polling
    Poll,

    /// Register the webhook and the command menu
    Setup {
        /// Public URL of the webhook endpoint
        #[arg(long, env = "TELEGRAM_WEBHOOK_URL")]
        webhook_url: String,
    },
}

impl Cli {
    /// Tracing filter directives for the verbosity level.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "daily_meditations=info,meditations_api=info,meditations_telegram=info,teloxide=warn",
            1 => "daily_meditations=debug,meditations_api=debug,meditations_core=debug,meditations_telegram=debug,teloxide=info",
            2 => "daily_meditations=trace,meditations_api=trace,meditations_core=trace,meditations_persistence=trace,meditations_telegram=trace,teloxide=debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["daily-meditations", "serve", "--port", "8080"]).unwrap();
        match cli.command {
            Commands::Serve { port, .. } => assert_eq!(port, 8080),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_bot_setup() {
        let cli = Cli::try_parse_from([
            "daily-meditations",
            "bot",
            "setup",
            "--webhook-url",
            "https://example.com/api/telegram/webhook",
        ])
        .unwrap();
        match cli.command {
            Commands::Bot {
                command: BotCommands::Setup { webhook_url },
            } => assert_eq!(webhook_url, "https://example.com/api/telegram/webhook"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_verbosity() {
        let cli = Cli::try_parse_from(["daily-meditations", "-vv", "bot", "poll"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.log_filter().contains("teloxide=debug"));

        let cli = Cli::try_parse_from(["daily-meditations", "bot", "poll"]).unwrap();
        assert!(cli.log_filter().contains("teloxide=warn"));
    }

    #[test]
    fn test_cli_help() {
        Cli::command().debug_assert();
    }
}
