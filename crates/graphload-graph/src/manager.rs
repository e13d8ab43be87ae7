//! Connection establishment and scoped release.

use graphload_core::ConnectionConfig;

use crate::client::{GraphConnection, GraphDriver, GraphError};

/// Whether a driver's backing library is present in this build.
///
/// Passed explicitly into [`ConnectionManager::new`]; an unavailable driver
/// fails on the first `connect` instead of at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCapability {
    Available,
    Unavailable,
}

impl DriverCapability {
    pub fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Establishes health-checked connections to a named graph.
pub struct ConnectionManager<D> {
    driver: D,
    capability: DriverCapability,
}

impl<D: GraphDriver> ConnectionManager<D> {
    pub fn new(driver: D, capability: DriverCapability) -> Self {
        Self { driver, capability }
    }

    /// Connect, select `config.graph_name` and ping the server.
    ///
    /// If the ping fails the freshly opened connection is dropped before the
    /// error is returned, so no partial state survives a failed connect.
    pub async fn connect(
        &self,
        config: &ConnectionConfig,
    ) -> Result<Connection<D::Connection>, GraphError> {
        if !self.capability.is_available() {
            tracing::error!(driver = self.driver.name(), "Graph driver not available");
            return Err(GraphError::DependencyUnavailable {
                driver: self.driver.name().to_string(),
            });
        }

        let inner = self.driver.connect(config).await?;
        if let Err(e) = inner.ping().await {
            drop(inner);
            return Err(match e {
                GraphError::Connection { .. } => e,
                other => GraphError::connection(target(config), other),
            });
        }

        tracing::info!(
            driver = self.driver.name(),
            address = %config.address(),
            graph = %config.graph_name,
            "Connected to graph database"
        );

        Ok(Connection {
            inner,
            graph_name: config.graph_name.clone(),
        })
    }
}

/// `host:port/graph`, as named in connection errors.
pub fn target(config: &ConnectionConfig) -> String {
    format!("{}/{}", config.address(), config.graph_name)
}

/// A live, health-checked connection owned by a single batch run.
///
/// The underlying driver connection is released when this value is dropped,
/// on every exit path.
pub struct Connection<C> {
    inner: C,
    graph_name: String,
}

impl<C: GraphConnection> Connection<C> {
    pub fn graph_name(&self) -> &str {
        &self.graph_name
    }

    /// Execute one statement against the selected graph.
    pub async fn query(&self, statement: &str) -> Result<(), GraphError> {
        self.inner.query(statement).await
    }
}

impl<C> Drop for Connection<C> {
    fn drop(&mut self) {
        tracing::debug!(graph = %self.graph_name, "Releasing graph connection");
    }
}
