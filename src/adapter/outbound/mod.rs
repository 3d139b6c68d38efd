//! Outbound adapters (driven side).

pub mod broker;
pub mod feed;
pub mod memory;
pub mod sqlite;
