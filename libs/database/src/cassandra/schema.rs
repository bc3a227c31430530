//! Keyspace provisioning helpers
//!
//! Identifiers cannot be bound as query parameters, so every keyspace or table name
//! interpolated into a statement must pass [`validate_identifier`] first.

use scylla::client::session::Session;
use tracing::info;

use super::error::CassandraError;

/// Maximum keyspace/table name length accepted by Cassandra
pub const MAX_IDENTIFIER_LEN: usize = 48;

// Unquoted identifiers are case-insensitive; `USE` must not quote them either
const KEYSPACE_CASE_SENSITIVE: bool = false;

/// Check that `name` is a plain unquoted CQL identifier (`[A-Za-z][A-Za-z0-9_]*`).
pub fn validate_identifier(name: &str) -> Result<&str, CassandraError> {
    let mut chars = name.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let rest_valid = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if starts_with_letter && rest_valid && name.len() <= MAX_IDENTIFIER_LEN {
        Ok(name)
    } else {
        Err(CassandraError::InvalidIdentifier(name.to_string()))
    }
}

/// `CREATE KEYSPACE IF NOT EXISTS` statement with SimpleStrategy replication
pub fn create_keyspace_statement(
    keyspace: &str,
    replication_factor: u32,
) -> Result<String, CassandraError> {
    let keyspace = validate_identifier(keyspace)?;
    Ok(format!(
        "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = {{'class': 'SimpleStrategy', 'replication_factor': {}}}",
        keyspace, replication_factor
    ))
}

/// Create a keyspace if it doesn't exist
///
/// # Example
/// ```ignore
/// use database::cassandra::create_keyspace_if_not_exists;
///
/// create_keyspace_if_not_exists(&session, "user_store", 1).await?;
/// ```
pub async fn create_keyspace_if_not_exists(
    session: &Session,
    keyspace: &str,
    replication_factor: u32,
) -> Result<(), CassandraError> {
    let statement = create_keyspace_statement(keyspace, replication_factor)?;

    session
        .query_unpaged(statement, ())
        .await
        .map_err(|e| CassandraError::schema("create keyspace", e))?;

    info!(keyspace, replication_factor, "Keyspace ready");
    Ok(())
}

/// Switch the session's default keyspace.
///
/// The name is sent unquoted, matching the DDL, so Cassandra folds it to lower case.
pub async fn use_keyspace(session: &Session, keyspace: &str) -> Result<(), CassandraError> {
    let keyspace = validate_identifier(keyspace)?;

    session
        .use_keyspace(keyspace, KEYSPACE_CASE_SENSITIVE)
        .await
        .map_err(|e| CassandraError::schema("use keyspace", e))?;

    info!(keyspace, "Using keyspace");
    Ok(())
}
