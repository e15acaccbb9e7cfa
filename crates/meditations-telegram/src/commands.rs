//! Bot command vocabulary.

use teloxide::utils::command::BotCommands;

/// Bot commands that can be invoked with /.
#[derive(BotCommands, Clone, Copy, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "🆘 Available commands:")]
pub enum Command {
    #[command(description = "Welcome message and main menu")]
    Start,

    #[command(description = "Show this help message")]
    Help,

    #[command(description = "Quick meditation options")]
    Meditate,

    #[command(description = "View your favorite meditations")]
    Favorites,

    #[command(description = "View your profile and subscription")]
    Profile,
}

impl Command {
    /// Parses the first token of a message.
    ///
    /// Case-insensitive, and a `@botname` suffix is ignored, so `/START@my_bot
    /// now` parses as [`Command::Start`]. Returns `None` for plain text and
    /// unknown commands.
    pub fn from_text(text: &str) -> Option<Self> {
        let token = text.split_whitespace().next()?;
        let name = token.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name).to_lowercase();

        match name.as_str() {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "meditate" => Some(Command::Meditate),
            "favorites" => Some(Command::Favorites),
            "profile" => Some(Command::Profile),
            _ => None,
        }
    }

    /// The help text listing every command.
    pub fn help_text() -> String {
        format!(
            "{}\n\n💡 Tip: Use the inline buttons for the best experience!",
            Command::descriptions()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text() {
        assert_eq!(Command::from_text("/start"), Some(Command::Start));
        assert_eq!(Command::from_text("  /help  me"), Some(Command::Help));
        assert_eq!(Command::from_text("/MEDITATE"), Some(Command::Meditate));
        assert_eq!(
            Command::from_text("/favorites@daily_meditations_bot"),
            Some(Command::Favorites)
        );
        assert_eq!(Command::from_text("/Profile@bot extra"), Some(Command::Profile));
    }

    #[test]
    fn test_from_text_rejects_non_commands() {
        assert_eq!(Command::from_text(""), None);
        assert_eq!(Command::from_text("start"), None);
        assert_eq!(Command::from_text("/unknown"), None);
        assert_eq!(Command::from_text("/startnow"), None);
    }

    #[test]
    fn test_help_lists_commands() {
        let help = Command::help_text();
        for name in ["/start", "/help", "/meditate", "/favorites", "/profile"] {
            assert!(help.contains(name), "missing {name}");
        }
    }

    #[test]
    fn test_bot_commands_for_menu() {
        assert_eq!(Command::bot_commands().len(), 5);
    }
}
