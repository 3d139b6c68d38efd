//! In-memory record store for tests and dry runs.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::domain::{
    ChatId, InsiderTrade, NewSession, NewUser, Session, SessionId, SystemState,
    SystemStateUpdate, TradeKey, User, UserId, UserUpdate,
};
use crate::error::{Error, Result};
use crate::port::outbound::store::{
    CredentialStore, SessionStore, SystemStateStore, TradeStore, UserStore,
};

#[derive(Debug, Default)]
struct Users {
    next_id: i32,
    by_chat: HashMap<ChatId, User>,
}

#[derive(Debug, Default)]
struct Sessions {
    next_id: i32,
    rows: Vec<Session>,
}

/// Record store backed by process memory.
///
/// Session supersede happens under a single write lock, so concurrent
/// creations for the same user can never both stay active.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<Users>,
    sessions: RwLock<Sessions>,
    system_state: RwLock<Option<SystemState>>,
    credentials: RwLock<HashMap<(UserId, String), String>>,
    trades: RwLock<HashSet<TradeKey>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored session, active or not, in creation order.
    pub fn all_sessions(&self) -> Vec<Session> {
        self.sessions.read().rows.clone()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut users = self.users.write();
        if users.by_chat.contains_key(&user.chat_id) {
            return Err(Error::Database(format!(
                "user with chat id {} already exists",
                user.chat_id
            )));
        }
        users.next_id += 1;
        let now = Utc::now();
        let created = User {
            id: UserId::new(users.next_id),
            chat_id: user.chat_id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_active: true,
            is_admin: false,
            created_at: now,
            updated_at: now,
        };
        users.by_chat.insert(created.chat_id, created.clone());
        Ok(created)
    }

    async fn get_user_by_chat_id(&self, chat_id: ChatId) -> Result<Option<User>> {
        Ok(self.users.read().by_chat.get(&chat_id).cloned())
    }

    async fn update_user(&self, chat_id: ChatId, update: UserUpdate) -> Result<bool> {
        let mut users = self.users.write();
        match users.by_chat.get_mut(&chat_id) {
            Some(user) => {
                update.apply(user, Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_active_users(&self) -> Result<Vec<User>> {
        let mut active: Vec<User> = self
            .users
            .read()
            .by_chat
            .values()
            .filter(|u| u.is_active)
            .cloned()
            .collect();
        active.sort_by_key(|u| u.id);
        Ok(active)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_session(&self, session: NewSession) -> Result<Session> {
        let mut sessions = self.sessions.write();
        for row in sessions
            .rows
            .iter_mut()
            .filter(|s| s.user_id == session.user_id)
        {
            row.is_active = false;
        }
        sessions.next_id += 1;
        let created = Session {
            id: SessionId::new(sessions.next_id),
            user_id: session.user_id,
            session_token: session.session_token,
            session_key: session.session_key,
            client_id: session.client_id,
            created_at: Utc::now(),
            expires_at: session.expires_at,
            is_active: true,
        };
        sessions.rows.push(created.clone());
        Ok(created)
    }

    async fn get_active_session(&self, user_id: UserId) -> Result<Option<Session>> {
        Ok(self
            .sessions
            .read()
            .rows
            .iter()
            .rev()
            .find(|s| s.user_id == user_id && s.is_active)
            .cloned())
    }

    async fn deactivate_session(&self, session_id: SessionId) -> Result<bool> {
        let mut sessions = self.sessions.write();
        match sessions.rows.iter_mut().find(|s| s.id == session_id) {
            Some(row) => {
                row.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl SystemStateStore for MemoryStore {
    async fn get_system_state(&self) -> Result<SystemState> {
        let mut state = self.system_state.write();
        Ok(state.get_or_insert_with(|| SystemState::fresh(Utc::now())).clone())
    }

    async fn update_system_state(&self, update: SystemStateUpdate) -> Result<()> {
        let now = Utc::now();
        let mut state = self.system_state.write();
        let current = state.get_or_insert_with(|| SystemState::fresh(now));
        update.apply(current, now);
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn save_credentials(&self, user_id: UserId, platform: &str, sealed: &str) -> Result<()> {
        self.credentials
            .write()
            .insert((user_id, platform.to_string()), sealed.to_string());
        Ok(())
    }

    async fn get_credentials(&self, user_id: UserId, platform: &str) -> Result<Option<String>> {
        Ok(self
            .credentials
            .read()
            .get(&(user_id, platform.to_string()))
            .cloned())
    }
}

#[async_trait]
impl TradeStore for MemoryStore {
    async fn trade_exists(&self, key: &TradeKey) -> Result<bool> {
        Ok(self.trades.read().contains(key))
    }

    async fn save_trade(&self, trade: &InsiderTrade) -> Result<bool> {
        Ok(self.trades.write().insert(trade.key()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderSide;
    use chrono::{Duration, NaiveDate};
    use rust_decimal::Decimal;

    fn new_session(user_id: UserId, token: &str) -> NewSession {
        NewSession {
            user_id,
            session_token: token.to_string(),
            session_key: format!("{token}-key"),
            client_id: "c1".to_string(),
            expires_at: Some(Utc::now() + Duration::hours(1)),
        }
    }

    #[tokio::test]
    async fn duplicate_chat_id_is_rejected() {
        let store = MemoryStore::new();
        store.create_user(NewUser::new(ChatId::new(7))).await.unwrap();
        let err = store.create_user(NewUser::new(ChatId::new(7))).await;
        assert!(matches!(err, Err(Error::Database(_))));
    }

    #[tokio::test]
    async fn new_session_supersedes_previous() {
        let store = MemoryStore::new();
        let user = store.create_user(NewUser::new(ChatId::new(1))).await.unwrap();

        let first = store.create_session(new_session(user.id, "a")).await.unwrap();
        let second = store.create_session(new_session(user.id, "b")).await.unwrap();

        let active = store.get_active_session(user.id).await.unwrap().unwrap();
        assert_eq!(active.id, second.id);
        let rows = store.all_sessions();
        assert!(!rows.iter().find(|s| s.id == first.id).unwrap().is_active);
        assert_eq!(rows.iter().filter(|s| s.is_active).count(), 1);
    }

    #[tokio::test]
    async fn sessions_of_other_users_are_untouched() {
        let store = MemoryStore::new();
        let a = store.create_user(NewUser::new(ChatId::new(1))).await.unwrap();
        let b = store.create_user(NewUser::new(ChatId::new(2))).await.unwrap();

        store.create_session(new_session(a.id, "a")).await.unwrap();
        store.create_session(new_session(b.id, "b")).await.unwrap();

        assert!(store.get_active_session(a.id).await.unwrap().is_some());
        assert!(store.get_active_session(b.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn deactivated_user_leaves_active_list() {
        let store = MemoryStore::new();
        store.create_user(NewUser::new(ChatId::new(1))).await.unwrap();
        store.create_user(NewUser::new(ChatId::new(2))).await.unwrap();

        assert!(store.deactivate_user(ChatId::new(1)).await.unwrap());
        assert!(!store.deactivate_user(ChatId::new(99)).await.unwrap());

        let active = store.list_active_users().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].chat_id, ChatId::new(2));
    }

    #[tokio::test]
    async fn system_state_is_created_lazily() {
        let store = MemoryStore::new();
        let state = store.get_system_state().await.unwrap();
        assert!(state.last_trade_check.is_none());

        let at = Utc::now();
        store
            .update_system_state(SystemStateUpdate::trade_check(at))
            .await
            .unwrap();
        let state = store.get_system_state().await.unwrap();
        assert_eq!(state.last_trade_check, Some(at));
        assert!(state.last_analysis_run.is_none());
    }

    #[tokio::test]
    async fn credentials_upsert_per_platform() {
        let store = MemoryStore::new();
        let id = UserId::new(1);
        store.save_credentials(id, "broker", "one").await.unwrap();
        store.save_credentials(id, "broker", "two").await.unwrap();

        assert_eq!(
            store.get_credentials(id, "broker").await.unwrap().as_deref(),
            Some("two")
        );
        assert!(store.get_credentials(id, "other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn repeated_trade_is_not_saved_twice() {
        let store = MemoryStore::new();
        let trade = InsiderTrade {
            company_name: "Acme Corp".into(),
            insider_name: "Jane Roe".into(),
            relationship: "Director".into(),
            transaction_date: NaiveDate::from_ymd_opt(2025, 9, 30).unwrap(),
            side: OrderSide::Buy,
            price: Decimal::from(12),
            quantity: Decimal::from(100),
            total_value: Decimal::from(1200),
        };

        assert!(!store.trade_exists(&trade.key()).await.unwrap());
        assert!(store.save_trade(&trade).await.unwrap());
        assert!(!store.save_trade(&trade).await.unwrap());
        assert!(store.trade_exists(&trade.key()).await.unwrap());
    }
}
