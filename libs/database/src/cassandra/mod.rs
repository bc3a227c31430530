//! Cassandra/ScyllaDB connector and utilities
//!
//! Provides the connection lifecycle ([`ConnectionManager`]), keyspace provisioning
//! helpers and health checks. Uses the `scylla` driver, which is compatible with both
//! Apache Cassandra and ScyllaDB.
//!
//! # Example
//!
//! ```ignore
//! use database::cassandra::{CassandraConfig, ConnectionManager, create_keyspace_if_not_exists};
//!
//! let config = CassandraConfig::new(vec!["127.0.0.1"])
//!     .with_keyspace("user_store")
//!     .with_datacenter("dc1");
//! let mut manager = ConnectionManager::connect(config).await?;
//!
//! let session = manager.session()?;
//! create_keyspace_if_not_exists(&session, manager.keyspace(), 1).await?;
//!
//! manager.disconnect();
//! ```

mod config;
mod connector;
mod error;
mod health;
mod schema;

pub use config::{CassandraConfig, DEFAULT_DATACENTER, DEFAULT_KEYSPACE, DEFAULT_PORT};
pub use connector::{CassandraSession, ConnectionManager};
pub use error::CassandraError;
pub use health::{ClusterInfo, HealthStatus, check_health_detailed, get_cluster_info};
pub use schema::{
    MAX_IDENTIFIER_LEN, create_keyspace_if_not_exists, create_keyspace_statement, use_keyspace,
    validate_identifier,
};

// Re-export scylla types for convenience
pub use scylla::client::session::Session;
pub use scylla::value::CqlValue;
