//! graphload-graph — connection management for the target graph database.
//!
//! All database access flows through the [`GraphDriver`] / [`GraphConnection`]
//! seam. [`ConnectionManager`] turns a validated configuration into a
//! health-checked [`Connection`] that is released when dropped.

pub mod client;
pub mod manager;
pub mod neo4j;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use client::{GraphConnection, GraphDriver, GraphError};
pub use manager::{Connection, ConnectionManager, DriverCapability};
pub use neo4j::{Neo4jConnection, Neo4jDriver};
