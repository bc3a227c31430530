use database::cassandra::{
    CassandraError, Session, create_keyspace_if_not_exists, use_keyspace, validate_identifier,
};
use tracing::{error, info, instrument};

use crate::queries::{EMAIL_INDEX, USERS_TABLE};

/// Replication policy for the users keyspace (SimpleStrategy)
pub const REPLICATION_FACTOR: u32 = 1;

pub fn create_table_statement(keyspace: &str) -> Result<String, CassandraError> {
    let keyspace = validate_identifier(keyspace)?;
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {}.{} (\
         id uuid PRIMARY KEY, \
         email text, \
         first_name text, \
         last_name text, \
         created_at timestamp, \
         updated_at timestamp)",
        keyspace, USERS_TABLE
    ))
}

pub fn create_email_index_statement(keyspace: &str) -> Result<String, CassandraError> {
    let keyspace = validate_identifier(keyspace)?;
    Ok(format!(
        "CREATE INDEX IF NOT EXISTS {} ON {}.{} (email)",
        EMAIL_INDEX, keyspace, USERS_TABLE
    ))
}

/// Ensure the keyspace, the `users` table and the email index exist.
///
/// Every statement is `IF NOT EXISTS`, so running this on each start is safe.
/// Must complete before any repository is used; any failure aborts start-up.
#[instrument(name = "users.schema.bootstrap", skip(session))]
pub async fn bootstrap(session: &Session, keyspace: &str) -> Result<(), CassandraError> {
    let result = run_steps(session, keyspace).await;

    match &result {
        Ok(()) => info!(keyspace, "User schema initialized"),
        Err(e) => error!(keyspace, error = %e, "User schema initialization failed"),
    }

    result
}

async fn run_steps(session: &Session, keyspace: &str) -> Result<(), CassandraError> {
    create_keyspace_if_not_exists(session, keyspace, REPLICATION_FACTOR).await?;
    use_keyspace(session, keyspace).await?;

    session
        .query_unpaged(create_table_statement(keyspace)?, ())
        .await
        .map_err(|e| CassandraError::Schema {
            step: "create users table",
            details: e.to_string(),
        })?;
    info!(table = USERS_TABLE, "Table ready");

    session
        .query_unpaged(create_email_index_statement(keyspace)?, ())
        .await
        .map_err(|e| CassandraError::Schema {
            step: "create email index",
            details: e.to_string(),
        })?;
    info!(index = EMAIL_INDEX, "Index ready");

    Ok(())
}
