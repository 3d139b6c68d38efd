//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!     ┌──────────────┤  retry / client /       ├──────────────┐
//!     │              │  recovery / scheduler   │              │
//!     │              └─────────────────────────┘              │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌───────────┐
//! │Brokerage│            │   Record    │              │ Notifier  │
//! │ Adapter │            │   Store     │              │  Adapter  │
//! └─────────┘            └─────────────┘              └───────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`BrokerageBackend`] - Raw brokerage API
//! - [`RecordStore`] - Users, sessions, system state, credentials, trades
//! - [`TradeFeed`] - Insider trade source
//! - [`Notifier`] - Chat delivery

pub mod outbound;

pub use outbound::brokerage::{BrokerResult, BrokerageBackend};
pub use outbound::feed::TradeFeed;
pub use outbound::notifier::{Notifier, NullNotifier};
pub use outbound::store::{
    CredentialStore, RecordStore, SessionStore, SystemStateStore, TradeStore, UserStore,
};
