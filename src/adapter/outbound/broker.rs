//! Simulated brokerage backend.
//!
//! Stands in for a real broker until a wire protocol is wired up. Login
//! accepts any complete credential pair, the portfolio and balances are
//! fixed, and orders are confirmed immediately.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::domain::{
    AccountInfo, BrokerCredentials, BrokerSession, Funds, OrderConfirmation, OrderRequest,
    Position,
};
use crate::port::outbound::brokerage::{BrokerResult, BrokerageBackend};

const SIM_CLIENT_ID: &str = "sim-client-54321";
const SIM_CURRENCY: &str = "EUR";

/// In-process stand-in for a brokerage API.
#[derive(Debug)]
pub struct SimulatedBroker {
    latency: Duration,
    logged_in: RwLock<bool>,
}

impl SimulatedBroker {
    pub fn new() -> Self {
        Self::with_latency(Duration::from_millis(100))
    }

    /// Sleep `latency` before answering each call.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            logged_in: RwLock::new(false),
        }
    }

    async fn round_trip(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn positions() -> Vec<Position> {
        vec![
            Position {
                product_id: "12345".to_string(),
                symbol: "AAPL".to_string(),
                name: "Apple Inc.".to_string(),
                quantity: Decimal::from(10),
                price: Decimal::new(15025, 2),
                total_value: Decimal::new(150250, 2),
            },
            Position {
                product_id: "67890".to_string(),
                symbol: "GOOGL".to_string(),
                name: "Alphabet Inc.".to_string(),
                quantity: Decimal::from(5),
                price: Decimal::new(250075, 2),
                total_value: Decimal::new(1250375, 2),
            },
        ]
    }
}

impl Default for SimulatedBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrokerageBackend for SimulatedBroker {
    async fn login(
        &self,
        credentials: &BrokerCredentials,
    ) -> BrokerResult<(BrokerSession, AccountInfo)> {
        self.round_trip().await;
        if !credentials.is_complete() {
            warn!("Simulated login refused, missing credentials");
            return Ok(None);
        }

        *self.logged_in.write() = true;
        info!(username = %credentials.username, "Simulated login succeeded");
        Ok(Some((
            BrokerSession {
                session_token: format!("sim-session-{}", uuid::Uuid::new_v4().simple()),
                session_key: format!("sim-key-{}", uuid::Uuid::new_v4().simple()),
                client_id: SIM_CLIENT_ID.to_string(),
            },
            AccountInfo {
                client_id: SIM_CLIENT_ID.to_string(),
                username: credentials.username.clone(),
                currency: SIM_CURRENCY.to_string(),
            },
        )))
    }

    async fn portfolio(&self) -> BrokerResult<Vec<Position>> {
        self.round_trip().await;
        if !*self.logged_in.read() {
            return Ok(None);
        }
        Ok(Some(Self::positions()))
    }

    async fn funds(&self) -> BrokerResult<Funds> {
        self.round_trip().await;
        if !*self.logged_in.read() {
            return Ok(None);
        }
        Ok(Some(Funds {
            currency: SIM_CURRENCY.to_string(),
            available: Decimal::from(5000),
            total: Decimal::from(20000),
        }))
    }

    async fn place_order(&self, order: &OrderRequest) -> BrokerResult<OrderConfirmation> {
        self.round_trip().await;
        if !*self.logged_in.read() {
            return Ok(None);
        }
        let id = format!("sim-order-{}", Utc::now().format("%Y%m%d_%H%M%S"));
        info!(
            side = %order.side,
            quantity = %order.quantity,
            product_id = %order.product_id,
            "Simulated order placed"
        );
        Ok(Some(OrderConfirmation::new(id)))
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderSide;

    fn broker() -> SimulatedBroker {
        SimulatedBroker::with_latency(Duration::ZERO)
    }

    #[tokio::test]
    async fn refuses_incomplete_credentials() {
        let broker = broker();
        let result = broker.login(&BrokerCredentials::new("ann", "")).await.unwrap();
        assert!(result.is_none());
        assert!(broker.portfolio().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn login_yields_eur_account() {
        let broker = broker();
        let (session, account) = broker
            .login(&BrokerCredentials::new("ann", "pw"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.client_id, SIM_CLIENT_ID);
        assert_eq!(account.currency, "EUR");
        assert_eq!(account.username, "ann");
    }

    #[tokio::test]
    async fn fixed_portfolio_and_funds_after_login() {
        let broker = broker();
        broker
            .login(&BrokerCredentials::new("ann", "pw"))
            .await
            .unwrap();

        let positions = broker.portfolio().await.unwrap().unwrap();
        let symbols: Vec<_> = positions.iter().map(|p| p.symbol.as_str()).collect();
        assert_eq!(symbols, ["AAPL", "GOOGL"]);
        for p in &positions {
            assert_eq!(p.quantity * p.price, p.total_value);
        }

        let funds = broker.funds().await.unwrap().unwrap();
        assert_eq!(funds.available, Decimal::from(5000));
        assert_eq!(funds.total, Decimal::from(20000));
    }

    #[tokio::test]
    async fn orders_are_confirmed() {
        let broker = broker();
        broker
            .login(&BrokerCredentials::new("ann", "pw"))
            .await
            .unwrap();
        let order = OrderRequest::try_new("12345", Decimal::ONE, OrderSide::Buy, None).unwrap();

        let confirmation = broker.place_order(&order).await.unwrap().unwrap();
        assert!(confirmation.as_str().starts_with("sim-order-"));
    }
}
