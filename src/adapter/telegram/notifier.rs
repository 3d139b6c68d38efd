//! Telegram delivery and command listener.
//!
//! Provides the [`TelegramNotifier`] for pushing alerts to chats and a
//! background command listener that routes bot commands through
//! [`TelegramControl`].
//!
//! Requires the `telegram` feature to be enabled.

use teloxide::prelude::*;
use teloxide::types::{BotCommand, ChatId as TgChatId};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::domain::{ChatId, NewUser};
use crate::port::outbound::notifier::Notifier;

use super::command::{bot_commands, parse_command};
use super::control::TelegramControl;

/// Outbound message queued for delivery.
#[derive(Debug)]
struct Outbound {
    chat_id: ChatId,
    text: String,
}

/// Telegram notifier that sends messages to chats.
///
/// Implements the [`Notifier`] trait. Messages are queued on an unbounded
/// channel and delivered by a background worker in order.
pub struct TelegramNotifier {
    /// Channel sender for queuing outbound notifications.
    sender: mpsc::UnboundedSender<Outbound>,
}

impl TelegramNotifier {
    /// Create a new Telegram notifier and spawn the delivery worker.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(bot_token: &str) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(telegram_worker(Bot::new(bot_token), receiver));
        Self { sender }
    }
}

impl Notifier for TelegramNotifier {
    fn notify(&self, chat_id: ChatId, text: String) {
        if self.sender.send(Outbound { chat_id, text }).is_err() {
            warn!(chat_id = %chat_id, "Telegram notifier channel closed");
        }
    }
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("open", &!self.sender.is_closed())
            .finish()
    }
}

/// Background worker that sends Telegram messages.
async fn telegram_worker(bot: Bot, mut receiver: mpsc::UnboundedReceiver<Outbound>) {
    info!("Telegram notifier started");

    while let Some(message) = receiver.recv().await {
        if let Err(e) = bot
            .send_message(TgChatId(message.chat_id.get()), &message.text)
            .await
        {
            error!(chat_id = %message.chat_id, error = %e, "Failed to send Telegram message");
        }
    }

    warn!("Telegram notifier worker shutting down");
}

/// Spawn the inbound command listener.
///
/// Every chat may talk to the bot; commands resolve the sender through
/// the user directory.
#[must_use]
pub fn spawn_command_listener(bot_token: &str, control: TelegramControl) -> JoinHandle<()> {
    tokio::spawn(telegram_command_worker(Bot::new(bot_token), control))
}

fn contact_for(msg: &Message) -> NewUser {
    let mut contact = NewUser::new(ChatId::new(msg.chat.id.0));
    if let Some(from) = msg.from.as_ref() {
        contact = contact.with_names(from.first_name.clone(), from.last_name.clone());
        if let Some(username) = &from.username {
            contact = contact.with_username(username.clone());
        }
    }
    contact
}

/// Background worker that handles inbound Telegram commands.
async fn telegram_command_worker(bot: Bot, control: TelegramControl) {
    // Register commands with Telegram so they appear in the "/" menu
    if let Err(e) = register_bot_commands(&bot).await {
        warn!(error = %e, "Failed to register bot commands with Telegram");
    }

    info!("Telegram command listener started");

    teloxide::repl(bot, move |bot: Bot, msg: Message| {
        let control = control.clone();
        async move {
            let Some(text) = msg.text() else {
                return respond(());
            };

            if let Some(response) = control.respond(contact_for(&msg), text).await {
                if let Err(e) = bot.send_message(msg.chat.id, response).await {
                    error!(error = %e, "Failed to send Telegram command response");
                }
            }

            // Drop messages that carried a password from the chat history.
            if parse_command(text).is_ok_and(|command| command.carries_secret()) {
                if let Err(e) = bot.delete_message(msg.chat.id, msg.id).await {
                    warn!(error = %e, "Failed to delete credential message");
                }
            }

            respond(())
        }
    })
    .await;
}

/// Register bot commands with Telegram for the "/" menu.
async fn register_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    let commands: Vec<BotCommand> = bot_commands()
        .into_iter()
        .map(|(cmd, desc)| BotCommand::new(cmd, desc))
        .collect();

    bot.set_my_commands(commands).await?;
    info!("Registered bot commands with Telegram");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn notify_after_worker_exit_does_not_panic() {
        let (sender, receiver) = mpsc::unbounded_channel::<Outbound>();
        drop(receiver);
        let notifier = TelegramNotifier { sender };

        notifier.notify(ChatId::new(1), "lost".to_string());
        assert!(format!("{notifier:?}").contains("open: false"));
    }

    #[tokio::test]
    async fn queued_messages_keep_order() {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Outbound>();
        let notifier = TelegramNotifier { sender };

        notifier.notify(ChatId::new(1), "first".to_string());
        notifier.notify(ChatId::new(2), "second".to_string());

        let first = receiver.recv().await.unwrap();
        let second = receiver.recv().await.unwrap();
        assert_eq!((first.chat_id, first.text.as_str()), (ChatId::new(1), "first"));
        assert_eq!((second.chat_id, second.text.as_str()), (ChatId::new(2), "second"));
    }
}
