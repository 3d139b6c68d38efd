//! Persistence ports for users, brokerage sessions, system state and
//! relayed trades.

use async_trait::async_trait;

use crate::domain::{
    ChatId, InsiderTrade, NewSession, NewUser, Session, SessionId, SystemState,
    SystemStateUpdate, TradeKey, User, UserId, UserUpdate,
};
use crate::error::Result;

/// Storage operations for chat users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. The chat id must not exist yet.
    async fn create_user(&self, user: NewUser) -> Result<User>;

    /// Look up a user by external chat id.
    async fn get_user_by_chat_id(&self, chat_id: ChatId) -> Result<Option<User>>;

    /// Apply a partial update. Returns false if no such user exists.
    async fn update_user(&self, chat_id: ChatId, update: UserUpdate) -> Result<bool>;

    /// All users with `is_active` set.
    async fn list_active_users(&self) -> Result<Vec<User>>;

    /// Soft-deactivate a user. Returns false if no such user exists.
    async fn deactivate_user(&self, chat_id: ChatId) -> Result<bool> {
        self.update_user(chat_id, UserUpdate::deactivate()).await
    }
}

/// Storage operations for brokerage sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a session for its user, deactivating every earlier session of
    /// that user in the same transaction.
    async fn create_session(&self, session: NewSession) -> Result<Session>;

    /// The user's active session, if any.
    async fn get_active_session(&self, user_id: UserId) -> Result<Option<Session>>;

    /// Deactivate one session. Returns false if it did not exist.
    async fn deactivate_session(&self, session_id: SessionId) -> Result<bool>;
}

/// Storage operations for the system-state singleton.
#[async_trait]
pub trait SystemStateStore: Send + Sync {
    /// Read the singleton, creating an empty one if absent.
    async fn get_system_state(&self) -> Result<SystemState>;

    /// Apply a partial update, creating the singleton if absent.
    async fn update_system_state(&self, update: SystemStateUpdate) -> Result<()>;
}

/// Storage operations for encrypted brokerage credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert or replace the sealed credentials for a user and platform.
    async fn save_credentials(&self, user_id: UserId, platform: &str, sealed: &str)
        -> Result<()>;

    /// Sealed credentials for a user and platform, if stored.
    async fn get_credentials(&self, user_id: UserId, platform: &str) -> Result<Option<String>>;
}

/// Storage operations for insider trades already relayed to users.
#[async_trait]
pub trait TradeStore: Send + Sync {
    /// Whether a trade with this identity has been recorded.
    async fn trade_exists(&self, key: &TradeKey) -> Result<bool>;

    /// Record a trade. Returns false if one with the same identity was
    /// already recorded, in which case nothing is written.
    async fn save_trade(&self, trade: &InsiderTrade) -> Result<bool>;
}

/// Everything the core needs from persistence.
pub trait RecordStore:
    UserStore + SessionStore + SystemStateStore + CredentialStore + TradeStore
{
}

impl<T> RecordStore for T where
    T: UserStore + SessionStore + SystemStateStore + CredentialStore + TradeStore
{
}
