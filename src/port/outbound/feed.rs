//! Insider trade feed port.

use async_trait::async_trait;

use crate::domain::InsiderTrade;
use crate::error::Result;

/// Source of recent insider transactions.
#[async_trait]
pub trait TradeFeed: Send + Sync {
    async fn fetch_recent(&self) -> Result<Vec<InsiderTrade>>;
}
