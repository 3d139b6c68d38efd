//! Insider trade events relayed to users.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::brokerage::OrderSide;

/// One reported insider transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsiderTrade {
    pub company_name: String,
    pub insider_name: String,
    /// Role of the insider, e.g. CEO or CFO.
    pub relationship: String,
    pub transaction_date: NaiveDate,
    pub side: OrderSide,
    pub price: Decimal,
    pub quantity: Decimal,
    pub total_value: Decimal,
}

/// Identity of a trade for de-duplication across polls.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TradeKey {
    company_name: String,
    insider_name: String,
    transaction_date: NaiveDate,
}

impl TradeKey {
    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    pub fn insider_name(&self) -> &str {
        &self.insider_name
    }

    #[must_use]
    pub const fn transaction_date(&self) -> NaiveDate {
        self.transaction_date
    }
}

impl InsiderTrade {
    #[must_use]
    pub fn key(&self) -> TradeKey {
        TradeKey {
            company_name: self.company_name.clone(),
            insider_name: self.insider_name.clone(),
            transaction_date: self.transaction_date,
        }
    }

    /// Plain-text alert line for chat delivery.
    #[must_use]
    pub fn alert_text(&self) -> String {
        format!(
            "Insider {side}: {insider} ({relationship}) at {company}\n\
             {quantity} shares @ {price} = {total} on {date}",
            side = self.side,
            insider = self.insider_name,
            relationship = self.relationship,
            company = self.company_name,
            quantity = self.quantity,
            price = self.price.round_dp(2),
            total = self.total_value.round_dp(2),
            date = self.transaction_date,
        )
    }
}
