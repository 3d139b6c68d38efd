//! Domain validation errors for core domain types.
//!
//! These errors are returned by `try_new` constructors when an input
//! violates a domain rule.
//!
//! # Examples
//!
//! ```
//! use insiderwatch::domain::brokerage::{OrderRequest, OrderSide};
//! use insiderwatch::domain::error::DomainError;
//! use rust_decimal::Decimal;
//!
//! let result = OrderRequest::try_new("12345", Decimal::ZERO, OrderSide::Buy, None);
//! assert!(matches!(result, Err(DomainError::NonPositiveQuantity { .. })));
//! ```

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Orders must be for a positive quantity.
    #[error("quantity must be positive, got {quantity}")]
    NonPositiveQuantity {
        /// The invalid quantity that was provided.
        quantity: rust_decimal::Decimal,
    },

    /// Limit prices must be positive when present.
    #[error("limit price must be positive, got {price}")]
    NonPositivePrice {
        /// The invalid price that was provided.
        price: rust_decimal::Decimal,
    },

    /// Orders must reference a product.
    #[error("product id cannot be empty")]
    EmptyProductId,

    /// An order side string was not BUY or SELL.
    #[error("unknown order side `{0}`")]
    UnknownSide(String),
}
