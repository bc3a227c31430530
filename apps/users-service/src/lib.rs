//! Users service lifecycle
//!
//! Start-up is connect → schema bootstrap; the binary wraps [`start`] in a
//! caller-side retry and serves only once it succeeds.

pub mod config;

use database::cassandra::{CassandraConfig, CassandraError, ConnectionManager};
use domain_users::{UserRepository, UserService, schema};
use tracing::{info, warn};

/// Open the session and make sure the user schema exists.
///
/// A failed bootstrap drops the manager, which closes the session.
pub async fn start(config: &CassandraConfig) -> Result<ConnectionManager, CassandraError> {
    let manager = ConnectionManager::connect(config.clone()).await?;
    let session = manager.session()?;
    schema::bootstrap(&session, manager.keyspace()).await?;
    Ok(manager)
}

/// Log how many users are stored; a failing read is reported, not fatal.
pub async fn log_user_count<R: UserRepository>(service: &UserService<R>) -> Option<usize> {
    match service.get_all_users().await {
        Ok(users) => {
            info!(count = users.len(), "Users service ready");
            Some(users.len())
        }
        Err(e) => {
            warn!(error = %e, "Users service ready, user count unavailable");
            None
        }
    }
}
