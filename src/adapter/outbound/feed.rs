//! Simulated insider trade feed.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::{InsiderTrade, OrderSide};
use crate::error::Result;
use crate::port::outbound::feed::TradeFeed;

/// Feed that always reports the same recent filings.
#[derive(Debug, Clone)]
pub struct SimulatedTradeFeed {
    trades: Vec<InsiderTrade>,
}

impl SimulatedTradeFeed {
    pub fn new() -> Self {
        Self::with_trades(Self::sample())
    }

    pub fn with_trades(trades: Vec<InsiderTrade>) -> Self {
        Self { trades }
    }

    fn sample() -> Vec<InsiderTrade> {
        let mut trades = Vec::with_capacity(2);
        if let Some(date) = NaiveDate::from_ymd_opt(2025, 11, 1) {
            trades.push(InsiderTrade {
                company_name: "TechCorp Inc.".to_string(),
                insider_name: "John Doe".to_string(),
                relationship: "CEO".to_string(),
                transaction_date: date,
                side: OrderSide::Buy,
                price: Decimal::new(15025, 2),
                quantity: Decimal::from(1000),
                total_value: Decimal::from(150_250),
            });
        }
        if let Some(date) = NaiveDate::from_ymd_opt(2025, 10, 31) {
            trades.push(InsiderTrade {
                company_name: "Global Solutions Ltd.".to_string(),
                insider_name: "Jane Smith".to_string(),
                relationship: "CFO".to_string(),
                transaction_date: date,
                side: OrderSide::Sell,
                price: Decimal::new(4275, 2),
                quantity: Decimal::from(5000),
                total_value: Decimal::from(213_750),
            });
        }
        trades
    }
}

impl Default for SimulatedTradeFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TradeFeed for SimulatedTradeFeed {
    async fn fetch_recent(&self) -> Result<Vec<InsiderTrade>> {
        Ok(self.trades.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sample_trades_have_distinct_keys() {
        let trades = SimulatedTradeFeed::new().fetch_recent().await.unwrap();
        assert_eq!(trades.len(), 2);
        assert_ne!(trades[0].key(), trades[1].key());
        for trade in &trades {
            assert_eq!(trade.price * trade.quantity, trade.total_value);
        }
    }
}
