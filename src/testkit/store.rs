//! Record store wrapper that injects failures.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::adapter::outbound::memory::MemoryStore;
use crate::domain::{
    ChatId, InsiderTrade, NewSession, NewUser, Session, SessionId, SystemState,
    SystemStateUpdate, TradeKey, User, UserId, UserUpdate,
};
use crate::error::{Error, Result};
use crate::port::outbound::store::{
    CredentialStore, SessionStore, SystemStateStore, TradeStore, UserStore,
};

/// Delegates to a [`MemoryStore`] except where told to fail.
pub struct FlakyStore {
    inner: Arc<MemoryStore>,
    fail_user_list: bool,
    fail_system_state: bool,
    fail_sessions_for: HashSet<UserId>,
}

impl FlakyStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            fail_user_list: false,
            fail_system_state: false,
            fail_sessions_for: HashSet::new(),
        }
    }

    /// `list_active_users` always fails.
    pub fn failing_user_list(mut self) -> Self {
        self.fail_user_list = true;
        self
    }

    /// System state reads and writes always fail.
    pub fn failing_system_state(mut self) -> Self {
        self.fail_system_state = true;
        self
    }

    /// Session reads and writes for `user_id` always fail.
    pub fn failing_sessions_for(mut self, user_id: UserId) -> Self {
        self.fail_sessions_for.insert(user_id);
        self
    }

    fn injected(what: &str) -> Error {
        Error::Database(format!("injected failure: {what}"))
    }
}

#[async_trait]
impl UserStore for FlakyStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        self.inner.create_user(user).await
    }

    async fn get_user_by_chat_id(&self, chat_id: ChatId) -> Result<Option<User>> {
        self.inner.get_user_by_chat_id(chat_id).await
    }

    async fn update_user(&self, chat_id: ChatId, update: UserUpdate) -> Result<bool> {
        self.inner.update_user(chat_id, update).await
    }

    async fn list_active_users(&self) -> Result<Vec<User>> {
        if self.fail_user_list {
            return Err(Self::injected("list_active_users"));
        }
        self.inner.list_active_users().await
    }
}

#[async_trait]
impl SessionStore for FlakyStore {
    async fn create_session(&self, session: NewSession) -> Result<Session> {
        if self.fail_sessions_for.contains(&session.user_id) {
            return Err(Self::injected("create_session"));
        }
        self.inner.create_session(session).await
    }

    async fn get_active_session(&self, user_id: UserId) -> Result<Option<Session>> {
        if self.fail_sessions_for.contains(&user_id) {
            return Err(Self::injected("get_active_session"));
        }
        self.inner.get_active_session(user_id).await
    }

    async fn deactivate_session(&self, session_id: SessionId) -> Result<bool> {
        self.inner.deactivate_session(session_id).await
    }
}

#[async_trait]
impl SystemStateStore for FlakyStore {
    async fn get_system_state(&self) -> Result<SystemState> {
        if self.fail_system_state {
            return Err(Self::injected("get_system_state"));
        }
        self.inner.get_system_state().await
    }

    async fn update_system_state(&self, update: SystemStateUpdate) -> Result<()> {
        if self.fail_system_state {
            return Err(Self::injected("update_system_state"));
        }
        self.inner.update_system_state(update).await
    }
}

#[async_trait]
impl CredentialStore for FlakyStore {
    async fn save_credentials(&self, user_id: UserId, platform: &str, sealed: &str) -> Result<()> {
        self.inner.save_credentials(user_id, platform, sealed).await
    }

    async fn get_credentials(&self, user_id: UserId, platform: &str) -> Result<Option<String>> {
        self.inner.get_credentials(user_id, platform).await
    }
}

#[async_trait]
impl TradeStore for FlakyStore {
    async fn trade_exists(&self, key: &TradeKey) -> Result<bool> {
        self.inner.trade_exists(key).await
    }

    async fn save_trade(&self, trade: &InsiderTrade) -> Result<bool> {
        self.inner.save_trade(trade).await
    }
}
