//! Command-line interface definitions.
//!
//! Defines the CLI structure for the insiderwatch binary using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Insider trading alert bot with brokerage integration
#[derive(Parser, Debug)]
#[command(name = "insiderwatch")]
#[command(version)]
pub struct Cli {
    /// TOML file with non-secret tunables (logging, retry, scheduler)
    #[arg(long, short, global = true, env = "INSIDERWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level subcommands. `run` is the default.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Recover stored sessions, then serve the bot and scheduler until Ctrl-C
    Run,
    /// Run one recovery pass and print the report
    Recover,
    /// Validate configuration and exit
    Check,
}

impl Cli {
    /// Subcommand to execute, defaulting to `run`.
    #[must_use]
    pub fn selected(&self) -> Commands {
        self.command.unwrap_or(Commands::Run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_is_the_default() {
        let cli = Cli::try_parse_from(["insiderwatch"]).unwrap();
        assert_eq!(cli.selected(), Commands::Run);
        assert!(cli.config.is_none());
    }

    #[test]
    fn subcommands_parse() {
        let cli = Cli::try_parse_from(["insiderwatch", "recover"]).unwrap();
        assert_eq!(cli.selected(), Commands::Recover);

        let cli = Cli::try_parse_from(["insiderwatch", "check", "--config", "bot.toml"]).unwrap();
        assert_eq!(cli.selected(), Commands::Check);
        assert_eq!(cli.config, Some(PathBuf::from("bot.toml")));
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["insiderwatch", "trade"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
