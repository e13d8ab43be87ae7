//! The driver seam between graphload and a graph database.

use graphload_core::ConnectionConfig;

/// Boxed underlying cause from a driver or transport.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Graph driver '{driver}' is not available in this build")]
    DependencyUnavailable { driver: String },

    #[error("Connection error for {target}: {source}")]
    Connection {
        target: String,
        #[source]
        source: BoxError,
    },

    #[error("Query error: {0}")]
    Query(#[source] BoxError),
}

impl GraphError {
    pub fn connection(target: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Connection {
            target: target.into(),
            source: source.into(),
        }
    }

    pub fn query(source: impl Into<BoxError>) -> Self {
        Self::Query(source.into())
    }
}

/// Opens connections to a graph database server.
#[allow(async_fn_in_trait)]
pub trait GraphDriver {
    type Connection: GraphConnection;

    /// Short driver name used in logs and availability errors.
    fn name(&self) -> &str;

    /// Open a connection to the server and select `config.graph_name`.
    async fn connect(&self, config: &ConnectionConfig) -> Result<Self::Connection, GraphError>;
}

/// An open connection with a selected graph.
///
/// Dropping the connection releases it.
#[allow(async_fn_in_trait)]
pub trait GraphConnection {
    /// Health check — verify the server answers on this connection.
    async fn ping(&self) -> Result<(), GraphError>;

    /// Execute a single statement against the selected graph, discarding rows.
    async fn query(&self, statement: &str) -> Result<(), GraphError>;
}
