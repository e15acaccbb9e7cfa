//! Daily Meditations command-line entry point.

pub mod cli;
pub mod run;

pub use cli::{BotCommands, Cli, Commands};
pub use run::{execute, RunError};
