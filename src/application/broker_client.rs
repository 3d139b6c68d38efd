//! Resilient brokerage client.
//!
//! [`BrokerClient`] sits between the rest of the application and a raw
//! [`BrokerageBackend`]. It tracks whether a login is live, retries every
//! remote call with the configured [`RetryPolicy`], and collapses every
//! failure into `false`/`None` so callers never see backend errors.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::application::retry::{RetryOutcome, RetryPolicy};
use crate::domain::{
    AccountInfo, BrokerCredentials, BrokerSession, Funds, OrderConfirmation, OrderRequest,
    Position,
};
use crate::port::outbound::brokerage::BrokerageBackend;

/// In-memory connection state. Never persisted.
#[derive(Debug, Clone, Default)]
struct ClientState {
    connected: bool,
    session: Option<BrokerSession>,
    account: Option<AccountInfo>,
}

/// Brokerage client with bounded retry and connection tracking.
pub struct BrokerClient {
    backend: Arc<dyn BrokerageBackend>,
    policy: RetryPolicy,
    state: RwLock<ClientState>,
}

impl BrokerClient {
    /// Create a disconnected client.
    pub fn new(backend: Arc<dyn BrokerageBackend>, policy: RetryPolicy) -> Self {
        Self {
            backend,
            policy,
            state: RwLock::new(ClientState::default()),
        }
    }

    /// Retry policy in effect.
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Log in with the given credentials.
    ///
    /// Returns `true` on success. On failure the client stays disconnected
    /// and any previous session is kept as is.
    pub async fn login(&self, credentials: &BrokerCredentials) -> bool {
        let backend = &self.backend;
        let outcome = self
            .policy
            .run("login", move |_| backend.login(credentials))
            .await;

        match outcome {
            RetryOutcome::Succeeded {
                value: (session, account),
                attempts,
            } => {
                info!(
                    backend = self.backend.name(),
                    client_id = %account.client_id,
                    currency = %account.currency,
                    attempts,
                    "Brokerage login succeeded"
                );
                let mut state = self.state.write();
                state.connected = true;
                state.session = Some(session);
                state.account = Some(account);
                true
            }
            RetryOutcome::Exhausted { attempts, .. } => {
                warn!(
                    backend = self.backend.name(),
                    username = %credentials.username,
                    attempts,
                    "Brokerage login failed"
                );
                false
            }
        }
    }

    /// Drop the local session. Never fails and does not contact the broker.
    pub fn logout(&self) {
        let mut state = self.state.write();
        *state = ClientState::default();
        debug!(backend = self.backend.name(), "Brokerage client logged out");
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state.read().connected
    }

    /// Live session bundle, only while connected.
    #[must_use]
    pub fn session(&self) -> Option<BrokerSession> {
        let state = self.state.read();
        if state.connected {
            state.session.clone()
        } else {
            None
        }
    }

    /// Account metadata from the last successful login, while connected.
    #[must_use]
    pub fn account(&self) -> Option<AccountInfo> {
        let state = self.state.read();
        if state.connected {
            state.account.clone()
        } else {
            None
        }
    }

    /// Current holdings, or `None` if disconnected or every attempt failed.
    pub async fn portfolio(&self) -> Option<Vec<Position>> {
        if !self.ready("portfolio") {
            return None;
        }
        let backend = &self.backend;
        self.policy
            .run("portfolio", move |_| backend.portfolio())
            .await
            .into_option()
    }

    /// Cash balances, or `None` if disconnected or every attempt failed.
    pub async fn funds(&self) -> Option<Funds> {
        if !self.ready("funds") {
            return None;
        }
        let backend = &self.backend;
        self.policy
            .run("funds", move |_| backend.funds())
            .await
            .into_option()
    }

    /// Submit an order, or `None` if disconnected or every attempt failed.
    pub async fn place_order(&self, order: &OrderRequest) -> Option<OrderConfirmation> {
        if !self.ready("place_order") {
            return None;
        }
        let backend = &self.backend;
        let outcome = self
            .policy
            .run("place_order", move |_| backend.place_order(order))
            .await;

        if let RetryOutcome::Succeeded { value, .. } = &outcome {
            info!(
                product_id = %order.product_id,
                side = %order.side,
                quantity = %order.quantity,
                confirmation = %value,
                "Order placed"
            );
        }
        outcome.into_option()
    }

    fn ready(&self, operation: &'static str) -> bool {
        let connected = self.is_connected();
        if !connected {
            warn!(operation, "Brokerage client not connected");
        }
        connected
    }
}

impl std::fmt::Debug for BrokerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerClient")
            .field("backend", &self.backend.name())
            .field("policy", &self.policy)
            .field("connected", &self.is_connected())
            .finish()
    }
}
