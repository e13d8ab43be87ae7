//! In-memory graph driver for tests.
//!
//! Any statement containing `BROKEN` is rejected; everything else succeeds.
//! Available to other crates through the `test-util` feature.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use graphload_core::ConnectionConfig;

use crate::client::{GraphConnection, GraphDriver, GraphError};
use crate::manager::{target, ConnectionManager, DriverCapability};

/// What the mock driver observed, shared with the test.
#[derive(Default)]
pub struct MockState {
    pub connects: AtomicUsize,
    pub released: AtomicBool,
    pub executed: Mutex<Vec<String>>,
}

impl MockState {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[derive(Default)]
pub struct MockDriver {
    pub state: Arc<MockState>,
    /// Fail `connect` as an unreachable server would.
    pub refuse: bool,
    /// Accept the connection but fail the health check.
    pub fail_ping: bool,
}

pub struct MockConnection {
    state: Arc<MockState>,
    fail_ping: bool,
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        self.state.released.store(true, Ordering::SeqCst);
    }
}

impl GraphDriver for MockDriver {
    type Connection = MockConnection;

    fn name(&self) -> &str {
        "mock"
    }

    async fn connect(&self, config: &ConnectionConfig) -> Result<MockConnection, GraphError> {
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        if self.refuse {
            return Err(GraphError::connection(target(config), "connection refused"));
        }
        Ok(MockConnection {
            state: self.state.clone(),
            fail_ping: self.fail_ping,
        })
    }
}

impl GraphConnection for MockConnection {
    async fn ping(&self) -> Result<(), GraphError> {
        if self.fail_ping {
            return Err(GraphError::query("Neo.ClientError.Security.Unauthorized"));
        }
        Ok(())
    }

    async fn query(&self, statement: &str) -> Result<(), GraphError> {
        self.state
            .executed
            .lock()
            .unwrap()
            .push(statement.to_string());
        if statement.contains("BROKEN") {
            return Err(GraphError::query(format!("Invalid input '{statement}'")));
        }
        Ok(())
    }
}

/// A manager over `driver` with the driver marked available.
pub fn manager(driver: MockDriver) -> ConnectionManager<MockDriver> {
    ConnectionManager::new(driver, DriverCapability::Available)
}
