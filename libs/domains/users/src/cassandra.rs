use async_trait::async_trait;
use chrono::{DateTime, Utc};
use database::cassandra::{CassandraSession, CqlValue};
use futures::TryStreamExt;
use scylla::DeserializeRow;
use scylla::errors::ExecutionError;
use scylla::response::query_result::QueryResult;
use scylla::statement::prepared::PreparedStatement;
use scylla::value::Row;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{UpdateUser, User};
use crate::queries::UserQueries;
use crate::repository::UserRepository;

/// Row shape of `SELECT id, email, first_name, last_name, created_at, updated_at`.
///
/// Columns are nullable at the storage level: an UPDATE racing a DELETE can leave a
/// partial row behind. Such rows are not full records and are skipped.
#[derive(Debug, DeserializeRow)]
struct UserRow {
    id: Uuid,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl UserRow {
    fn into_user(self) -> Option<User> {
        match self {
            UserRow {
                id,
                email: Some(email),
                first_name: Some(first_name),
                last_name: Some(last_name),
                created_at: Some(created_at),
                updated_at: Some(updated_at),
            } => Some(User {
                id,
                email,
                first_name,
                last_name,
                created_at,
                updated_at,
            }),
            UserRow { id, .. } => {
                warn!(user_id = %id, "Skipping partial user row");
                None
            }
        }
    }
}

struct PreparedUserStatements {
    select_by_id: PreparedStatement,
    select_all: PreparedStatement,
    select_by_email: PreparedStatement,
    insert: PreparedStatement,
    delete: PreparedStatement,
    delete_if_exists: PreparedStatement,
}

/// Cassandra/ScyllaDB implementation of [`UserRepository`].
///
/// Fixed statements are prepared once at construction. Partial-update statements
/// depend on which fields are supplied and are prepared on first use, then cached.
/// Request timeouts come from the session's execution profile.
pub struct CassandraUserRepository {
    session: CassandraSession,
    queries: UserQueries,
    statements: PreparedUserStatements,
    update_cache: RwLock<HashMap<String, PreparedStatement>>,
}

impl CassandraUserRepository {
    /// Prepare the user statements against `keyspace`.
    ///
    /// The schema must already exist (see [`crate::schema::bootstrap`]).
    pub async fn new(session: CassandraSession, keyspace: &str) -> UserResult<Self> {
        let queries = UserQueries::new(keyspace)
            .map_err(|e| UserError::invalid_argument(e.to_string()))?;

        let statements = PreparedUserStatements {
            select_by_id: prepare(&session, queries.select_by_id()).await?,
            select_all: prepare(&session, queries.select_all()).await?,
            select_by_email: prepare(&session, queries.select_by_email()).await?,
            insert: prepare(&session, queries.insert()).await?,
            delete: prepare(&session, queries.delete()).await?,
            delete_if_exists: prepare(&session, queries.delete_if_exists()).await?,
        };

        debug!(table = queries.table(), "Prepared user statements");

        Ok(Self {
            session,
            queries,
            statements,
            update_cache: RwLock::new(HashMap::new()),
        })
    }

    async fn prepared_update(&self, cql: &str) -> UserResult<PreparedStatement> {
        if let Some(statement) = self.update_cache.read().await.get(cql) {
            return Ok(statement.clone());
        }

        let statement = prepare(&self.session, cql.to_string()).await?;
        self.update_cache
            .write()
            .await
            .insert(cql.to_string(), statement.clone());
        Ok(statement)
    }

    async fn execute_update(
        &self,
        id: Uuid,
        changes: &UpdateUser,
        updated_at: DateTime<Utc>,
        conditional: bool,
    ) -> UserResult<QueryResult> {
        let update = self.queries.update(id, changes, updated_at, conditional);
        let statement = self.prepared_update(&update.cql).await?;

        self.session
            .execute_unpaged(&statement, update.values)
            .await
            .map_err(|e| execution_error("updating user", e))
    }

    async fn collect_users(
        &self,
        statement: &PreparedStatement,
        values: Vec<CqlValue>,
        operation: &'static str,
    ) -> UserResult<Vec<User>> {
        let rows: Vec<UserRow> = self
            .session
            .execute_iter(statement.clone(), values)
            .await
            .map_err(|e| query_error(operation, e))?
            .rows_stream::<UserRow>()
            .map_err(|e| query_error(operation, e))?
            .try_collect()
            .await
            .map_err(|e| query_error(operation, e))?;

        Ok(rows.into_iter().filter_map(UserRow::into_user).collect())
    }
}

#[async_trait]
impl UserRepository for CassandraUserRepository {
    #[instrument(name = "users.repo.list", skip(self))]
    async fn list(&self) -> UserResult<Vec<User>> {
        let users = self
            .collect_users(&self.statements.select_all, Vec::new(), "fetching users")
            .await?;
        debug!(count = users.len(), "Fetched users");
        Ok(users)
    }

    #[instrument(name = "users.repo.get_by_id", skip(self), fields(user_id = %id))]
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let operation = "fetching user";
        let row = self
            .session
            .execute_unpaged(&self.statements.select_by_id, (id,))
            .await
            .map_err(|e| execution_error(operation, e))?
            .into_rows_result()
            .map_err(|e| query_error(operation, e))?
            .maybe_first_row::<UserRow>()
            .map_err(|e| query_error(operation, e))?;

        Ok(row.and_then(UserRow::into_user))
    }

    #[instrument(name = "users.repo.find_by_email", skip(self, email))]
    async fn find_by_email(&self, email: &str) -> UserResult<Vec<User>> {
        self.collect_users(
            &self.statements.select_by_email,
            vec![CqlValue::Text(email.to_string())],
            "fetching users by email",
        )
        .await
    }

    #[instrument(name = "users.repo.insert", skip(self, user), fields(user_id = %user.id))]
    async fn insert(&self, user: &User) -> UserResult<()> {
        self.session
            .execute_unpaged(
                &self.statements.insert,
                (
                    user.id,
                    &user.email,
                    &user.first_name,
                    &user.last_name,
                    user.created_at,
                    user.updated_at,
                ),
            )
            .await
            .map_err(|e| execution_error("creating user", e))?;
        Ok(())
    }

    #[instrument(name = "users.repo.update", skip(self, changes), fields(user_id = %id))]
    async fn update(
        &self,
        id: Uuid,
        changes: &UpdateUser,
        updated_at: DateTime<Utc>,
    ) -> UserResult<()> {
        self.execute_update(id, changes, updated_at, false).await?;
        Ok(())
    }

    #[instrument(name = "users.repo.update_if_exists", skip(self, changes), fields(user_id = %id))]
    async fn update_if_exists(
        &self,
        id: Uuid,
        changes: &UpdateUser,
        updated_at: DateTime<Utc>,
    ) -> UserResult<bool> {
        let result = self.execute_update(id, changes, updated_at, true).await?;
        was_applied(result, "updating user")
    }

    #[instrument(name = "users.repo.delete", skip(self), fields(user_id = %id))]
    async fn delete(&self, id: Uuid) -> UserResult<()> {
        self.session
            .execute_unpaged(&self.statements.delete, (id,))
            .await
            .map_err(|e| execution_error("deleting user", e))?;
        Ok(())
    }

    #[instrument(name = "users.repo.delete_if_exists", skip(self), fields(user_id = %id))]
    async fn delete_if_exists(&self, id: Uuid) -> UserResult<bool> {
        let result = self
            .session
            .execute_unpaged(&self.statements.delete_if_exists, (id,))
            .await
            .map_err(|e| execution_error("deleting user", e))?;
        was_applied(result, "deleting user")
    }
}

async fn prepare(session: &CassandraSession, cql: String) -> UserResult<PreparedStatement> {
    session
        .prepare(cql)
        .await
        .map_err(|e| query_error("preparing statement", e))
}

/// Read the `[applied]` flag of a lightweight-transaction result
fn was_applied(result: QueryResult, operation: &'static str) -> UserResult<bool> {
    let row = result
        .into_rows_result()
        .map_err(|e| query_error(operation, e))?
        .maybe_first_row::<Row>()
        .map_err(|e| query_error(operation, e))?;

    Ok(matches!(
        row.and_then(|r| r.columns.into_iter().next().flatten()),
        Some(CqlValue::Boolean(true))
    ))
}

fn execution_error(operation: &'static str, err: ExecutionError) -> UserError {
    if let ExecutionError::RequestTimeout(timeout) = &err {
        error!(operation, ?timeout, "Cassandra request timed out");
        return UserError::Timeout { operation };
    }
    query_error(operation, err)
}

fn query_error<E>(operation: &'static str, err: E) -> UserError
where
    E: std::error::Error + Send + Sync + 'static,
{
    error!(operation, error = %err, "Cassandra query failed");
    UserError::query(operation, err)
}
