//! Brokerage-side value types.
//!
//! These are the payloads exchanged with a [`BrokerageBackend`]: login
//! credentials, the opaque session bundle a login returns, account metadata,
//! portfolio positions, fund balances and orders.
//!
//! [`BrokerageBackend`]: crate::port::outbound::brokerage::BrokerageBackend

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Username/password pair for a brokerage login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerCredentials {
    pub username: String,
    pub password: String,
}

impl BrokerCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Both halves present and non-empty.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for BrokerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrokerCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Opaque credential bundle issued by the broker on login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerSession {
    pub session_token: String,
    pub session_key: String,
    pub client_id: String,
}

/// Minimal account metadata recorded on login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub client_id: String,
    pub username: String,
    pub currency: String,
}

/// A single holding in the brokerage portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub product_id: String,
    pub symbol: String,
    pub name: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub total_value: Decimal,
}

/// Cash balances of the brokerage account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Funds {
    pub currency: String,
    pub available: Decimal,
    pub total: Decimal,
}

/// Buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderSide {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BUY" => Ok(Self::Buy),
            "SELL" => Ok(Self::Sell),
            _ => Err(DomainError::UnknownSide(s.to_string())),
        }
    }
}

/// An order to submit to the broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub product_id: String,
    pub quantity: Decimal,
    pub side: OrderSide,
    /// Limit price; `None` is a market order.
    pub price: Option<Decimal>,
}

impl OrderRequest {
    /// Validate and build an order.
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError`] for an empty product id, a non-positive
    /// quantity, or a non-positive limit price.
    pub fn try_new(
        product_id: impl Into<String>,
        quantity: Decimal,
        side: OrderSide,
        price: Option<Decimal>,
    ) -> Result<Self, DomainError> {
        let product_id = product_id.into();
        if product_id.trim().is_empty() {
            return Err(DomainError::EmptyProductId);
        }
        if quantity <= Decimal::ZERO {
            return Err(DomainError::NonPositiveQuantity { quantity });
        }
        if let Some(price) = price {
            if price <= Decimal::ZERO {
                return Err(DomainError::NonPositivePrice { price });
            }
        }
        Ok(Self {
            product_id,
            quantity,
            side,
            price,
        })
    }
}

/// Broker-issued order confirmation id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderConfirmation(String);

impl OrderConfirmation {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderConfirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
