//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe infrastructure dependencies: the brokerage
//! backend, the record store, the trade feed and the messaging gateway.

pub mod brokerage;
pub mod feed;
pub mod notifier;
pub mod store;
