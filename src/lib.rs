//! Insiderwatch - insider trading alerts over Telegram with a resilient
//! brokerage session layer.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - [`domain`] - Users, brokerage sessions, system state, brokerage payloads
//! - [`port`] - Traits for the brokerage backend, record store, trade feed
//!   and messaging gateway
//! - [`application`] - Retry policy, brokerage client, startup recovery,
//!   scheduler and supporting services
//! - [`adapter`] - SQLite and in-memory stores, simulated brokerage and feed,
//!   Telegram bot, CLI
//! - [`infrastructure`] - Configuration, logging, credential encryption and
//!   the composition root
//!
//! # Features
//!
//! - `telegram` (default) - Telegram delivery and command listener
//! - `testkit` - Test doubles for integration tests

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
