//! Telegram command parsing.

use crate::domain::BrokerCredentials;

/// Supported Telegram commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelegramCommand {
    Start,
    Help,
    Status,
    Portfolio,
    Funds,
    Connect(BrokerCredentials),
    Disconnect,
    Settings,
}

impl TelegramCommand {
    /// Command name without the leading slash, for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Help => "help",
            Self::Status => "status",
            Self::Portfolio => "portfolio",
            Self::Funds => "funds",
            Self::Connect(_) => "connect",
            Self::Disconnect => "disconnect",
            Self::Settings => "settings",
        }
    }

    /// Whether the raw message carries a secret and should be removed from
    /// the chat once handled.
    #[must_use]
    pub const fn carries_secret(&self) -> bool {
        matches!(self, Self::Connect(_))
    }
}

/// Parse error for Telegram command messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    NotACommand,
    UnknownCommand(String),
    MissingArgument(&'static str),
}

impl std::fmt::Display for CommandParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotACommand => write!(f, "message is not a command"),
            Self::UnknownCommand(cmd) => write!(f, "unknown command `{cmd}`"),
            Self::MissingArgument(name) => write!(f, "missing argument `{name}`"),
        }
    }
}

impl std::error::Error for CommandParseError {}

/// Parse a Telegram message into a bot command.
///
/// A `@botname` suffix on the command is ignored.
pub fn parse_command(text: &str) -> Result<TelegramCommand, CommandParseError> {
    let mut parts = text.split_whitespace();
    let Some(raw_command) = parts.next() else {
        return Err(CommandParseError::NotACommand);
    };
    if !raw_command.starts_with('/') {
        return Err(CommandParseError::NotACommand);
    }

    let command = raw_command
        .split_once('@')
        .map_or(raw_command, |(head, _)| head);

    match command {
        "/start" => Ok(TelegramCommand::Start),
        "/help" => Ok(TelegramCommand::Help),
        "/status" => Ok(TelegramCommand::Status),
        "/portfolio" => Ok(TelegramCommand::Portfolio),
        "/funds" => Ok(TelegramCommand::Funds),
        "/disconnect" => Ok(TelegramCommand::Disconnect),
        "/settings" => Ok(TelegramCommand::Settings),
        "/connect" => {
            let username = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("username"))?;
            let password = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("password"))?;
            Ok(TelegramCommand::Connect(BrokerCredentials::new(
                username, password,
            )))
        }
        other => Err(CommandParseError::UnknownCommand(other.to_string())),
    }
}

/// Help text returned by `/help` and appended to parse errors.
#[must_use]
pub const fn command_help() -> &'static str {
    "📋 Commands\n\n\
    /start - Subscribe to insider trading alerts\n\
    /help - Show this help message\n\
    /status - Bot status and last analysis run\n\
    /portfolio - Brokerage portfolio\n\
    /funds - Available brokerage funds\n\
    /connect <username> <password> - Connect your brokerage account\n\
    /disconnect - Disconnect your brokerage account\n\
    /settings - Notification settings"
}

/// Bot commands for Telegram menu registration.
///
/// Returns tuples of (command, description) for `set_my_commands`.
#[must_use]
pub fn bot_commands() -> Vec<(&'static str, &'static str)> {
    vec![
        ("start", "Subscribe to insider trading alerts"),
        ("status", "Bot status and last analysis run"),
        ("portfolio", "Brokerage portfolio"),
        ("funds", "Available brokerage funds"),
        ("connect", "Connect your brokerage account"),
        ("disconnect", "Disconnect your brokerage account"),
        ("settings", "Notification settings"),
        ("help", "Show all commands"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_all_basic_commands() {
        assert_eq!(parse_command("/start").unwrap(), TelegramCommand::Start);
        assert_eq!(parse_command("/help").unwrap(), TelegramCommand::Help);
        assert_eq!(parse_command("/status").unwrap(), TelegramCommand::Status);
        assert_eq!(
            parse_command("/portfolio").unwrap(),
            TelegramCommand::Portfolio
        );
        assert_eq!(parse_command("/funds").unwrap(), TelegramCommand::Funds);
        assert_eq!(
            parse_command("/disconnect").unwrap(),
            TelegramCommand::Disconnect
        );
        assert_eq!(
            parse_command("/settings").unwrap(),
            TelegramCommand::Settings
        );
    }

    #[test]
    fn parse_command_with_bot_mention() {
        assert_eq!(
            parse_command("/portfolio@insiderwatch_bot").unwrap(),
            TelegramCommand::Portfolio
        );
        assert_eq!(
            parse_command("/help@another_bot_123").unwrap(),
            TelegramCommand::Help
        );
    }

    #[test]
    fn parse_connect_with_credentials() {
        let command = parse_command("/connect trader s3cret").unwrap();
        assert_eq!(
            command,
            TelegramCommand::Connect(BrokerCredentials::new("trader", "s3cret"))
        );
        assert!(command.carries_secret());
    }

    #[test]
    fn connect_requires_both_arguments() {
        assert_eq!(
            parse_command("/connect"),
            Err(CommandParseError::MissingArgument("username"))
        );
        assert_eq!(
            parse_command("/connect trader"),
            Err(CommandParseError::MissingArgument("password"))
        );
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(parse_command("hello"), Err(CommandParseError::NotACommand));
        assert_eq!(parse_command("   "), Err(CommandParseError::NotACommand));
        assert_eq!(parse_command(""), Err(CommandParseError::NotACommand));
    }

    #[test]
    fn unknown_command_is_reported() {
        assert_eq!(
            parse_command("/pause"),
            Err(CommandParseError::UnknownCommand("/pause".into()))
        );
    }

    #[test]
    fn parse_errors_render_readably() {
        assert_eq!(
            CommandParseError::MissingArgument("password").to_string(),
            "missing argument `password`"
        );
        assert_eq!(
            CommandParseError::UnknownCommand("/x".into()).to_string(),
            "unknown command `/x`"
        );
    }

    #[test]
    fn every_menu_command_parses() {
        for (name, _) in bot_commands() {
            let text = if name == "connect" {
                "/connect u p".to_string()
            } else {
                format!("/{name}")
            };
            let parsed = parse_command(&text).unwrap();
            assert_eq!(parsed.name(), name);
        }
    }

    #[test]
    fn help_lists_every_menu_command() {
        let help = command_help();
        for (name, _) in bot_commands() {
            assert!(help.contains(&format!("/{name}")), "missing /{name}");
        }
    }
}
