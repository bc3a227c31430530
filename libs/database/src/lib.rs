//! Database library providing the Cassandra/ScyllaDB connector and shared utilities
//!
//! # Features
//!
//! - `cassandra` (default) - Cassandra/ScyllaDB support via the `scylla` driver
//! - `config` - Configuration support with `core_config::FromEnv`
//! - `all` - All features
//!
//! # Example
//!
//! ```ignore
//! use database::cassandra::{CassandraConfig, ConnectionManager};
//!
//! let config = CassandraConfig::default().with_keyspace("user_store");
//! let mut manager = ConnectionManager::connect(config).await?;
//! let session = manager.session()?;
//! session.query_unpaged("SELECT release_version FROM system.local", ()).await?;
//! manager.disconnect();
//! ```

// Always available modules
pub mod common;

#[cfg(feature = "cassandra")]
pub mod cassandra;
