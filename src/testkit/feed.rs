//! Trade feed doubles.

use async_trait::async_trait;

use crate::domain::InsiderTrade;
use crate::error::{Error, Result};
use crate::port::outbound::feed::TradeFeed;

/// Feed whose every fetch fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingFeed;

#[async_trait]
impl TradeFeed for FailingFeed {
    async fn fetch_recent(&self) -> Result<Vec<InsiderTrade>> {
        Err(Error::Connection("trade feed unreachable".to_string()))
    }
}
