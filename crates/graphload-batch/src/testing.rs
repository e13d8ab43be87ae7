//! Shared fixtures for unit tests.

use graphload_core::ConnectionSettings;

pub use graphload_graph::testing::{manager, MockConnection, MockDriver};

pub fn settings() -> ConnectionSettings {
    ConnectionSettings {
        host: Some("localhost".to_string()),
        port: Some(7687),
        username: None,
        password: Some("pw".to_string()),
        graph_name: Some("social".to_string()),
        fetch_size: 256,
    }
}
