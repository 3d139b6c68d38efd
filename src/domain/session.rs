//! Persisted brokerage sessions.
//!
//! A [`Session`] records one successful brokerage login for a user. At most
//! one session per user is active at a time: creating a new one supersedes
//! every earlier session for that user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::brokerage::BrokerSession;
use super::id::{SessionId, UserId};

/// A stored brokerage login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    /// Opaque session token issued by the broker.
    pub session_token: String,
    /// Opaque session key issued by the broker.
    pub session_key: String,
    /// Broker-side client identifier.
    pub client_id: String,
    pub created_at: DateTime<Utc>,
    /// `None` means the session never expires. Sessions created by the
    /// recovery path always carry an expiry.
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl Session {
    /// Whether the session can still be used at `now`.
    ///
    /// A session is valid iff it has no expiry or its expiry is strictly
    /// after `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            None => true,
            Some(expires_at) => expires_at > now,
        }
    }

    /// The broker credential bundle carried by this session.
    #[must_use]
    pub fn broker_session(&self) -> BrokerSession {
        BrokerSession {
            session_token: self.session_token.clone(),
            session_key: self.session_key.clone(),
            client_id: self.client_id.clone(),
        }
    }
}

/// Fields for a session about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub user_id: UserId,
    pub session_token: String,
    pub session_key: String,
    pub client_id: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewSession {
    /// Build a new session record from a broker login result.
    #[must_use]
    pub fn from_broker(
        user_id: UserId,
        session: &BrokerSession,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            user_id,
            session_token: session.session_token.clone(),
            session_key: session.session_key.clone(),
            client_id: session.client_id.clone(),
            expires_at,
        }
    }
}
