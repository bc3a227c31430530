//! ScyllaDB test infrastructure
//!
//! Provides a `TestScylla` helper that starts a ScyllaDB container and connects a
//! [`ConnectionManager`] to it.

use database::cassandra::{CassandraConfig, CassandraSession, ConnectionManager};
use testcontainers::ContainerAsync;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::scylladb::ScyllaDB;
use uuid::Uuid;

const CQL_PORT: u16 = 9042;

/// Test ScyllaDB wrapper that ensures proper cleanup
///
/// Each instance gets its own keyspace name, so tests sharing a container image
/// never see each other's rows. The keyspace itself is created by whatever
/// bootstrap the test runs.
///
/// # Example
///
/// ```no_run
/// use test_utils::TestScylla;
///
/// # async fn example() {
/// let scylla = TestScylla::new().await;
/// let session = scylla.session();
/// // Bootstrap schema against scylla.keyspace(), then use session
/// # }
/// ```
pub struct TestScylla {
    manager: ConnectionManager,
    #[allow(dead_code)]
    container: ContainerAsync<ScyllaDB>,
    config: CassandraConfig,
}

impl TestScylla {
    /// Start a container and connect to it
    pub async fn new() -> Self {
        let container = ScyllaDB::default()
            .start()
            .await
            .expect("Failed to start ScyllaDB container");

        let host_port = container
            .get_host_port_ipv4(CQL_PORT)
            .await
            .expect("Failed to get ScyllaDB port");

        let config = CassandraConfig::new(vec![format!("127.0.0.1:{}", host_port)])
            .with_keyspace(unique_keyspace())
            .with_request_timeout(60);

        let manager = ConnectionManager::connect(config.clone())
            .await
            .expect("Failed to connect to ScyllaDB");

        tracing::info!(
            port = host_port,
            keyspace = config.keyspace(),
            "Test ScyllaDB ready"
        );

        Self {
            manager,
            container,
            config,
        }
    }

    /// Shared session handle (useful for passing to repositories)
    pub fn session(&self) -> CassandraSession {
        self.manager
            .session()
            .expect("Test ScyllaDB session is connected")
    }

    /// Keyspace reserved for this instance
    pub fn keyspace(&self) -> &str {
        self.config.keyspace()
    }

    /// Config pointing at the container, for opening additional connections
    pub fn config(&self) -> CassandraConfig {
        self.config.clone()
    }

    pub fn manager(&mut self) -> &mut ConnectionManager {
        &mut self.manager
    }
}

// Container is automatically cleaned up when TestScylla is dropped
impl Drop for TestScylla {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up test ScyllaDB container");
    }
}

fn unique_keyspace() -> String {
    format!("test_{}", Uuid::new_v4().simple())
}
