//! Users Domain
//!
//! User records stored in a Cassandra/ScyllaDB `users` table, keyed by UUID with a
//! secondary index on email.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   Service   │  ← Id parsing, id/timestamp stamping, existence checks
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + Cassandra / in-memory implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Queries   │  ← CQL statements, keyspace-qualified and parameterized
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Schema    │  ← Keyspace / table / index bootstrap
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use database::cassandra::{CassandraConfig, ConnectionManager};
//! use domain_users::{CassandraUserRepository, CreateUser, UserService, schema};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let config = CassandraConfig::new(vec!["127.0.0.1"]);
//! let manager = ConnectionManager::connect(config).await?;
//! let session = manager.session()?;
//!
//! schema::bootstrap(&session, manager.keyspace()).await?;
//!
//! let repository = CassandraUserRepository::new(session, manager.keyspace()).await?;
//! let service = UserService::new(repository);
//!
//! let user = service
//!     .create_user(CreateUser::new("ada@example.com", "Ada", "Lovelace"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod cassandra;
pub mod error;
pub mod models;
pub mod queries;
pub mod repository;
pub mod schema;
pub mod service;

// Re-export commonly used types
pub use cassandra::CassandraUserRepository;
pub use error::{UserError, UserResult};
pub use models::{CreateUser, UpdateUser, User};
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::{UserService, WriteMode};
