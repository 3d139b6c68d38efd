//! Brokerage backend port.
//!
//! The backend is the raw, unreliable collaborator. Every call may either
//! return an operation-level failure (`Ok(None)`) or raise a fault (`Err`).
//! Retrying, backoff and connection-state tracking live in
//! [`BrokerClient`](crate::application::broker_client::BrokerClient).

use async_trait::async_trait;

use crate::domain::{
    AccountInfo, BrokerCredentials, BrokerSession, Funds, OrderConfirmation, OrderRequest,
    Position,
};
use crate::error::BrokerError;

/// Result of a single backend call.
pub type BrokerResult<T> = std::result::Result<Option<T>, BrokerError>;

/// Raw brokerage API.
#[async_trait]
pub trait BrokerageBackend: Send + Sync {
    /// Authenticate. `Ok(None)` means the credentials were refused.
    async fn login(
        &self,
        credentials: &BrokerCredentials,
    ) -> BrokerResult<(BrokerSession, AccountInfo)>;

    /// Current holdings.
    async fn portfolio(&self) -> BrokerResult<Vec<Position>>;

    /// Cash balances.
    async fn funds(&self) -> BrokerResult<Funds>;

    /// Submit an order.
    async fn place_order(&self, order: &OrderRequest) -> BrokerResult<OrderConfirmation>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}
