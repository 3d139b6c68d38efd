//! Telegram bot integration.
//!
//! Command parsing and execution are transport-agnostic; delivery and the
//! listener loop need the `telegram` feature.

pub mod command;
pub mod control;
#[cfg(feature = "telegram")]
pub mod notifier;

pub use control::{ControlSettings, TelegramControl};
#[cfg(feature = "telegram")]
pub use notifier::{spawn_command_listener, TelegramNotifier};
