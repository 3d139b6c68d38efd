//! Telegram command execution against the application services.
//!
//! Every reply is plain text. Store and brokerage failures never escape as
//! errors: they are logged and answered with a short apology.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::application::broker_client::BrokerClient;
use crate::application::recovery::RecoveryManager;
use crate::application::render;
use crate::application::users::UserDirectory;
use crate::application::vault::CredentialVault;
use crate::domain::{ChatId, NewUser, User};
use crate::port::outbound::store::{RecordStore, SystemStateStore};

use super::command::{command_help, parse_command, CommandParseError, TelegramCommand};

/// Read-only settings echoed by `/status` and `/settings`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlSettings {
    pub check_interval_minutes: u64,
    pub log_level: String,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            check_interval_minutes: 30,
            log_level: "info".to_string(),
        }
    }
}

/// Runtime command executor for Telegram chats.
#[derive(Clone)]
pub struct TelegramControl {
    users: UserDirectory,
    store: Arc<dyn RecordStore>,
    client: Arc<BrokerClient>,
    recovery: Arc<RecoveryManager>,
    vault: CredentialVault,
    settings: ControlSettings,
}

fn failure(action: &str) -> String {
    format!("❌ Error: {action}\n\nPlease try again or contact support.")
}

fn format_timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(
        || "Never".to_string(),
        |at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

const NOT_REGISTERED: &str = "❌ User not found. Please start the bot with /start";

impl TelegramControl {
    #[must_use]
    pub fn new(
        users: UserDirectory,
        store: Arc<dyn RecordStore>,
        client: Arc<BrokerClient>,
        recovery: Arc<RecoveryManager>,
        vault: CredentialVault,
        settings: ControlSettings,
    ) -> Self {
        Self {
            users,
            store,
            client,
            recovery,
            vault,
            settings,
        }
    }

    /// Parse `text` and execute it for `contact`.
    ///
    /// Returns `None` for plain text, and the help text with the parse error
    /// for malformed commands.
    pub async fn respond(&self, contact: NewUser, text: &str) -> Option<String> {
        match parse_command(text) {
            Ok(command) => Some(self.execute(contact, command).await),
            Err(CommandParseError::NotACommand) => None,
            Err(err) => Some(format!("Invalid command: {err}\n\n{}", command_help())),
        }
    }

    /// Execute one parsed command and return response text.
    pub async fn execute(&self, contact: NewUser, command: TelegramCommand) -> String {
        let chat_id = contact.chat_id;
        info!(chat_id = %chat_id, command = command.name(), "Handling Telegram command");

        match command {
            TelegramCommand::Start => self.start_text(contact).await,
            TelegramCommand::Help => command_help().to_string(),
            TelegramCommand::Status => self.status_text().await,
            TelegramCommand::Portfolio => self.portfolio_text(chat_id).await,
            TelegramCommand::Funds => self.funds_text(chat_id).await,
            TelegramCommand::Connect(credentials) => {
                self.connect_text(chat_id, &credentials).await
            }
            TelegramCommand::Disconnect => self.disconnect_text(chat_id).await,
            TelegramCommand::Settings => self.settings_text(),
        }
    }

    async fn start_text(&self, contact: NewUser) -> String {
        let chat_id = contact.chat_id;
        let returning = match self.users.find(chat_id).await {
            Ok(found) => found.is_some_and(|u| u.is_active),
            Err(e) => {
                error!(chat_id = %chat_id, error = %e, "Failed to look up user");
                return failure("Failed to process start command");
            }
        };

        let user = match self.users.touch(contact).await {
            Ok(user) => user,
            Err(e) => {
                error!(chat_id = %chat_id, error = %e, "Failed to register user");
                return failure("Failed to process start command");
            }
        };

        let greeting = if returning {
            format!("🎉 Welcome back, {}!", user.display_name())
        } else {
            format!("🎉 Welcome to Insider Watch, {}!", user.display_name())
        };
        format!(
            "{greeting}\n\n\
            I monitor insider trading activity and notify you when significant \
            transactions occur. You are subscribed to alerts.\n\n{}",
            command_help()
        )
    }

    async fn status_text(&self) -> String {
        let users = match self.users.active().await {
            Ok(users) => users.len(),
            Err(e) => {
                error!(error = %e, "Failed to count active users");
                return failure("Failed to retrieve status information");
            }
        };
        let state = match self.store.get_system_state().await {
            Ok(state) => state,
            Err(e) => {
                error!(error = %e, "Failed to load system state");
                return failure("Failed to retrieve status information");
            }
        };

        let integration = if self.recovery.integration_enabled() {
            "Enabled"
        } else {
            "Disabled"
        };
        let connection = if self.client.is_connected() {
            "Connected"
        } else {
            "Disconnected"
        };

        format!(
            "📊 Bot Status\n\n\
            Active Users: {users}\n\
            Check Interval: {} minutes\n\
            Last Trade Check: {}\n\
            Last Analysis Run: {}\n\n\
            Brokerage Integration: {integration}\n\
            Brokerage Connection: {connection}",
            self.settings.check_interval_minutes,
            format_timestamp(state.last_trade_check),
            format_timestamp(state.last_analysis_run),
        )
    }

    fn settings_text(&self) -> String {
        format!(
            "⚙️ Notification Settings\n\n\
            Notification preferences are managed globally.\n\n\
            Check Interval: every {} minutes\n\
            Log Level: {}",
            self.settings.check_interval_minutes, self.settings.log_level
        )
    }

    /// Registered user for `chat_id`, or the reply to send instead.
    async fn registered(&self, chat_id: ChatId, action: &str) -> Result<User, String> {
        match self.users.find(chat_id).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(NOT_REGISTERED.to_string()),
            Err(e) => {
                error!(chat_id = %chat_id, error = %e, "Failed to look up user");
                Err(failure(action))
            }
        }
    }

    fn brokerage_unavailable(&self) -> Option<String> {
        if self.recovery.integration_enabled() || self.client.is_connected() {
            return None;
        }
        Some(
            "❌ Brokerage integration is not enabled. Connect an account with \
            /connect <username> <password>."
                .to_string(),
        )
    }

    fn currency(&self) -> String {
        self.client
            .account()
            .map_or_else(|| "EUR".to_string(), |account| account.currency)
    }

    async fn portfolio_text(&self, chat_id: ChatId) -> String {
        if let Some(reply) = self.brokerage_unavailable() {
            return reply;
        }
        if let Err(reply) = self.registered(chat_id, "Failed to retrieve portfolio").await {
            return reply;
        }

        match self.client.portfolio().await {
            Some(positions) => render::portfolio(&positions, &self.currency()),
            None => "❌ Unable to retrieve portfolio. Please check your brokerage connection."
                .to_string(),
        }
    }

    async fn funds_text(&self, chat_id: ChatId) -> String {
        if let Some(reply) = self.brokerage_unavailable() {
            return reply;
        }
        if let Err(reply) = self.registered(chat_id, "Failed to retrieve funds").await {
            return reply;
        }

        match self.client.funds().await {
            Some(funds) => render::funds(&funds),
            None => {
                "❌ Unable to retrieve funds. Please check your brokerage connection.".to_string()
            }
        }
    }

    async fn connect_text(
        &self,
        chat_id: ChatId,
        credentials: &crate::domain::BrokerCredentials,
    ) -> String {
        let user = match self.registered(chat_id, "Failed to connect account").await {
            Ok(user) => user,
            Err(reply) => return reply,
        };

        if !self.client.login(credentials).await {
            warn!(user_id = %user.id, "Brokerage login from chat failed");
            return "❌ Login failed. Please check your credentials and try again.".to_string();
        }
        let Some(session) = self.client.session() else {
            return failure("Failed to connect account");
        };

        if let Err(e) = self.vault.store(user.id, credentials).await {
            error!(user_id = %user.id, error = %e, "Failed to store credentials");
            return failure("Failed to connect account");
        }

        let expires_at = Utc::now() + self.recovery.session_ttl();
        if !self
            .recovery
            .save_user_session(&user, &session, expires_at)
            .await
        {
            return failure("Failed to connect account");
        }

        info!(user_id = %user.id, "Connected brokerage account");
        "✅ Brokerage account connected.".to_string()
    }

    async fn disconnect_text(&self, chat_id: ChatId) -> String {
        let user = match self.registered(chat_id, "Failed to disconnect account").await {
            Ok(user) => user,
            Err(reply) => return reply,
        };

        if self.recovery.user_session(&user).await.is_none() {
            return "⚠️ No active brokerage session found to disconnect.".to_string();
        }
        if !self.recovery.clear_user_session(&user).await {
            return failure("Failed to disconnect account");
        }

        self.client.logout();
        info!(user_id = %user.id, "Disconnected brokerage account");
        "✅ Successfully disconnected your brokerage account.".to_string()
    }
}

impl std::fmt::Debug for TelegramControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramControl")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
