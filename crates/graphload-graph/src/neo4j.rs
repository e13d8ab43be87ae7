//! Neo4j driver over Bolt, built on `neo4rs`.
//!
//! Compiled in with the `neo4j` feature (on by default). Without it the
//! driver still exists but reports [`DriverCapability::Unavailable`] and
//! refuses to connect.

use graphload_core::ConnectionConfig;

use crate::client::{GraphConnection, GraphDriver, GraphError};
use crate::manager::DriverCapability;

/// User sent when the configuration does not name one.
pub const DEFAULT_USER: &str = "neo4j";

/// Driver for Neo4j-compatible servers speaking Bolt.
#[derive(Debug, Clone, Default)]
pub struct Neo4jDriver;

impl Neo4jDriver {
    pub fn new() -> Self {
        Self
    }

    /// Whether the Bolt client library was compiled into this build.
    pub fn capability() -> DriverCapability {
        if cfg!(feature = "neo4j") {
            DriverCapability::Available
        } else {
            DriverCapability::Unavailable
        }
    }
}

#[cfg(feature = "neo4j")]
pub use bolt::Neo4jConnection;

#[cfg(feature = "neo4j")]
mod bolt {
    use neo4rs::{query, ConfigBuilder, Graph};

    use super::*;
    use crate::manager::target;

    /// A single Bolt connection bound to one database.
    ///
    /// Dropping it closes the underlying socket.
    pub struct Neo4jConnection {
        graph: Graph,
    }

    impl GraphDriver for Neo4jDriver {
        type Connection = Neo4jConnection;

        fn name(&self) -> &str {
            "neo4j"
        }

        async fn connect(&self, config: &ConnectionConfig) -> Result<Neo4jConnection, GraphError> {
            let uri = format!("bolt://{}", config.address());
            let neo_config = ConfigBuilder::default()
                .uri(uri.as_str())
                .user(config.username.as_deref().unwrap_or(DEFAULT_USER))
                .password(config.password.as_str())
                .db(config.graph_name.as_str())
                .max_connections(1)
                .fetch_size(config.fetch_size)
                .build()
                .map_err(|e| GraphError::connection(target(config), e))?;

            let graph = Graph::connect(neo_config)
                .await
                .map_err(|e| GraphError::connection(target(config), e))?;

            tracing::debug!(uri = %uri, graph = %config.graph_name, "Opened Bolt connection");
            Ok(Neo4jConnection { graph })
        }
    }

    impl GraphConnection for Neo4jConnection {
        async fn ping(&self) -> Result<(), GraphError> {
            self.graph
                .run(query("RETURN 1"))
                .await
                .map_err(GraphError::query)
        }

        async fn query(&self, statement: &str) -> Result<(), GraphError> {
            self.graph
                .run(query(statement))
                .await
                .map_err(GraphError::query)
        }
    }
}

/// Stand-in connection type for builds without the Bolt client.
#[cfg(not(feature = "neo4j"))]
pub enum Neo4jConnection {}

#[cfg(not(feature = "neo4j"))]
impl GraphDriver for Neo4jDriver {
    type Connection = Neo4jConnection;

    fn name(&self) -> &str {
        "neo4j"
    }

    async fn connect(&self, _config: &ConnectionConfig) -> Result<Neo4jConnection, GraphError> {
        Err(GraphError::DependencyUnavailable {
            driver: self.name().to_string(),
        })
    }
}

#[cfg(not(feature = "neo4j"))]
impl GraphConnection for Neo4jConnection {
    async fn ping(&self) -> Result<(), GraphError> {
        match *self {}
    }

    async fn query(&self, _statement: &str) -> Result<(), GraphError> {
        match *self {}
    }
}
