//! Application services (use cases).
//!
//! These services coordinate the domain with the ports: brokerage access
//! with retries, startup recovery, user registration, credential storage
//! and the periodic jobs.

pub mod broker_client;
pub mod recovery;
pub mod render;
pub mod retry;
pub mod scheduler;
pub mod users;
pub mod vault;
