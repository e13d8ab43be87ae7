//! graphload-core: Connection configuration shared by the graphload crates.
//!
//! - Raw connection settings as loaded from file and environment
//! - Validation into a complete [`ConnectionConfig`]
//! - Configuration error types

pub mod config;
pub mod error;

pub use crate::config::{ConnectionConfig, ConnectionSettings};
pub use error::ConfigError;
