//! Messaging gateway port.

use crate::domain::ChatId;

/// Delivers plain text to a chat.
///
/// Delivery is fire-and-forget: implementations queue the message and log
/// their own failures.
pub trait Notifier: Send + Sync {
    fn notify(&self, chat_id: ChatId, text: String);
}

/// Notifier that drops every message. Used when no gateway is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _chat_id: ChatId, _text: String) {}
}
