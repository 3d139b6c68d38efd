//! Chat users of the bot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{ChatId, UserId};

/// A chat user known to the bot.
///
/// Users are created on first contact and never hard-deleted; leaving the
/// bot only clears `is_active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub chat_id: ChatId,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Best human-readable name for log lines and greetings.
    #[must_use]
    pub fn display_name(&self) -> String {
        if let Some(first) = &self.first_name {
            return first.clone();
        }
        if let Some(username) = &self.username {
            return format!("@{username}");
        }
        self.chat_id.to_string()
    }
}

/// Fields needed to register a user on first contact.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewUser {
    pub chat_id: ChatId,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl NewUser {
    #[must_use]
    pub fn new(chat_id: ChatId) -> Self {
        Self {
            chat_id,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn with_names(mut self, first: impl Into<String>, last: Option<String>) -> Self {
        self.first_name = Some(first.into());
        self.last_name = last;
        self
    }
}

/// Partial update of a user; `None` leaves a field untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
    pub is_admin: Option<bool>,
}

impl UserUpdate {
    /// Refresh display names from a fresh contact and mark the user active.
    #[must_use]
    pub fn from_contact(contact: &NewUser) -> Self {
        Self {
            username: contact.username.clone(),
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
            is_active: Some(true),
            is_admin: None,
        }
    }

    /// Soft-deactivate the user.
    #[must_use]
    pub fn deactivate() -> Self {
        Self {
            is_active: Some(false),
            ..Default::default()
        }
    }

    /// Apply this update to an in-memory user.
    pub fn apply(&self, user: &mut User, now: DateTime<Utc>) {
        if let Some(username) = &self.username {
            user.username = Some(username.clone());
        }
        if let Some(first) = &self.first_name {
            user.first_name = Some(first.clone());
        }
        if let Some(last) = &self.last_name {
            user.last_name = Some(last.clone());
        }
        if let Some(active) = self.is_active {
            user.is_active = active;
        }
        if let Some(admin) = self.is_admin {
            user.is_admin = admin;
        }
        user.updated_at = now;
    }
}
