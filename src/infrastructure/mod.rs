//! Infrastructure layer.
//!
//! Technical concerns that support the application without containing
//! business logic.
//!
//! # Submodules
//!
//! - [`config`] - Configuration loading and validation
//! - [`context`] - Composition root for runtime wiring
//! - [`crypto`] - Credential encryption at rest

pub mod config;
pub mod context;
pub mod crypto;
