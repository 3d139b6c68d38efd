//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`broker`] - `ScriptedBroker`, a brokerage backend driven by per-call scripts.
//! - [`store`] - `FlakyStore`, a record store wrapper that injects failures.
//! - [`feed`] - Trade feed doubles.
//! - [`notifier`] - `RecordingNotifier`.
//! - [`config`] - Canonical test configurations.

pub mod broker;
pub mod config;
pub mod feed;
pub mod notifier;
pub mod store;
