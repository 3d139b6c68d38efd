//! Notifier double that records every message.

use parking_lot::Mutex;

use crate::domain::ChatId;
use crate::port::outbound::notifier::Notifier;

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(ChatId, String)>>,
}

impl RecordingNotifier {
    /// Messages delivered so far, in order.
    pub fn sent(&self) -> Vec<(ChatId, String)> {
        self.sent.lock().clone()
    }

    pub fn sent_to(&self, chat_id: ChatId) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter(|(to, _)| *to == chat_id)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, chat_id: ChatId, text: String) {
        self.sent.lock().push((chat_id, text));
    }
}
