//! Registration and lifecycle of chat users.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{ChatId, NewUser, User, UserUpdate};
use crate::error::{Error, Result};
use crate::port::outbound::store::UserStore;

/// Get-or-create access to users keyed by chat id.
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn UserStore>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Register a contact, or refresh the names of a known user.
    ///
    /// A returning user who had been deactivated is reactivated.
    pub async fn touch(&self, contact: NewUser) -> Result<User> {
        let chat_id = contact.chat_id;
        if self.store.get_user_by_chat_id(chat_id).await?.is_none() {
            let user = self.store.create_user(contact).await?;
            info!(user_id = %user.id, chat_id = %chat_id, "Registered new user");
            return Ok(user);
        }

        self.store
            .update_user(chat_id, UserUpdate::from_contact(&contact))
            .await?;
        debug!(chat_id = %chat_id, "Refreshed user");
        self.store
            .get_user_by_chat_id(chat_id)
            .await?
            .ok_or_else(|| Error::Database(format!("user {chat_id} vanished during update")))
    }

    /// Look up a user without registering.
    pub async fn find(&self, chat_id: ChatId) -> Result<Option<User>> {
        self.store.get_user_by_chat_id(chat_id).await
    }

    /// Soft-deactivate. Returns false for an unknown chat id.
    pub async fn deactivate(&self, chat_id: ChatId) -> Result<bool> {
        let found = self.store.deactivate_user(chat_id).await?;
        if found {
            info!(chat_id = %chat_id, "Deactivated user");
        }
        Ok(found)
    }

    /// All users that receive alerts.
    pub async fn active(&self) -> Result<Vec<User>> {
        self.store.list_active_users().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::memory::MemoryStore;

    fn directory() -> UserDirectory {
        UserDirectory::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn first_contact_creates_user() {
        let users = directory();
        let user = users
            .touch(NewUser::new(ChatId::new(11)).with_username("ann"))
            .await
            .unwrap();

        assert!(user.is_active);
        assert_eq!(user.username.as_deref(), Some("ann"));
        assert_eq!(users.active().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn repeat_contact_refreshes_names_and_keeps_id() {
        let users = directory();
        let first = users.touch(NewUser::new(ChatId::new(11))).await.unwrap();
        let second = users
            .touch(NewUser::new(ChatId::new(11)).with_names("Ann", Some("Lee".into())))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.first_name.as_deref(), Some("Ann"));
        assert_eq!(second.last_name.as_deref(), Some("Lee"));
    }

    #[tokio::test]
    async fn returning_user_is_reactivated() {
        let users = directory();
        users.touch(NewUser::new(ChatId::new(5))).await.unwrap();
        assert!(users.deactivate(ChatId::new(5)).await.unwrap());
        assert!(users.active().await.unwrap().is_empty());

        let user = users.touch(NewUser::new(ChatId::new(5))).await.unwrap();
        assert!(user.is_active);
    }

    #[tokio::test]
    async fn deactivating_unknown_user_reports_false() {
        assert!(!directory().deactivate(ChatId::new(404)).await.unwrap());
    }
}
