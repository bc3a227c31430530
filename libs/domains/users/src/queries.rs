//! CQL statements for the `users` table.
//!
//! Every caller-supplied value is bound as a parameter. The keyspace is the only
//! interpolated identifier and is validated when [`UserQueries`] is built.

use chrono::{DateTime, Utc};
use database::cassandra::{CassandraError, CqlValue, validate_identifier};
use scylla::value::CqlTimestamp;
use uuid::Uuid;

use crate::models::UpdateUser;

pub const USERS_TABLE: &str = "users";
pub const EMAIL_INDEX: &str = "users_email_idx";
pub const USER_COLUMNS: &str = "id, email, first_name, last_name, created_at, updated_at";

/// A partial update ready to execute: statement text plus values in bind order
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub cql: String,
    pub values: Vec<CqlValue>,
}

/// Statement texts for one keyspace
#[derive(Debug, Clone)]
pub struct UserQueries {
    table: String,
}

impl UserQueries {
    pub fn new(keyspace: &str) -> Result<Self, CassandraError> {
        let keyspace = validate_identifier(keyspace)?;
        Ok(Self {
            table: format!("{}.{}", keyspace, USERS_TABLE),
        })
    }

    /// Keyspace-qualified table name
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn select_all(&self) -> String {
        format!("SELECT {} FROM {}", USER_COLUMNS, self.table)
    }

    pub fn select_by_id(&self) -> String {
        format!("SELECT {} FROM {} WHERE id = ?", USER_COLUMNS, self.table)
    }

    /// Served by the secondary index on `email`
    pub fn select_by_email(&self) -> String {
        format!("SELECT {} FROM {} WHERE email = ?", USER_COLUMNS, self.table)
    }

    pub fn insert(&self) -> String {
        format!(
            "INSERT INTO {} ({}) VALUES (?, ?, ?, ?, ?, ?)",
            self.table, USER_COLUMNS
        )
    }

    pub fn delete(&self) -> String {
        format!("DELETE FROM {} WHERE id = ?", self.table)
    }

    pub fn delete_if_exists(&self) -> String {
        format!("DELETE FROM {} WHERE id = ? IF EXISTS", self.table)
    }

    /// Assemble an UPDATE covering only the supplied fields.
    ///
    /// Bind order: supplied fields (email, first_name, last_name), then `updated_at`,
    /// then `id` as the filter predicate. With `conditional` the statement becomes a
    /// lightweight transaction (`IF EXISTS`).
    pub fn update(
        &self,
        id: Uuid,
        changes: &UpdateUser,
        updated_at: DateTime<Utc>,
        conditional: bool,
    ) -> UpdateStatement {
        let mut assignments = Vec::with_capacity(4);
        let mut values = Vec::with_capacity(5);

        let fields = [
            ("email", &changes.email),
            ("first_name", &changes.first_name),
            ("last_name", &changes.last_name),
        ];
        for (column, value) in fields {
            if let Some(value) = value {
                assignments.push(format!("{} = ?", column));
                values.push(CqlValue::Text(value.clone()));
            }
        }

        assignments.push("updated_at = ?".to_string());
        values.push(CqlValue::Timestamp(CqlTimestamp(updated_at.timestamp_millis())));

        values.push(CqlValue::Uuid(id));

        let mut cql = format!(
            "UPDATE {} SET {} WHERE id = ?",
            self.table,
            assignments.join(", ")
        );
        if conditional {
            cql.push_str(" IF EXISTS");
        }

        UpdateStatement { cql, values }
    }
}
