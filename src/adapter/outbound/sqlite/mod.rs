//! SQLite persistence adapter.
//!
//! Durable implementation of the record store ports using Diesel ORM.

pub mod database;
pub mod store;

pub use database::connection::{create_pool, open, run_migrations, DbPool};
pub use store::SqliteRecordStore;
