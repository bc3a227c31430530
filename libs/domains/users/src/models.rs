use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store timestamps have millisecond resolution; values are truncated to match so a
/// freshly built record compares equal to the row read back.
pub fn store_timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// User entity - matches the `users` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Assigned at creation, never supplied by callers
    pub id: Uuid,
    /// Indexed for lookup, not unique
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Set once at creation
    pub created_at: DateTime<Utc>,
    /// Refreshed on every successful update
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a new record with a single timestamp for both `created_at` and `updated_at`
    pub fn new(id: Uuid, input: CreateUser, now: DateTime<Utc>) -> Self {
        Self {
            id,
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the supplied fields and refresh `updated_at`
    pub fn apply_update(&mut self, update: &UpdateUser, updated_at: DateTime<Utc>) {
        if let Some(email) = &update.email {
            self.email = email.clone();
        }
        if let Some(first_name) = &update.first_name {
            self.first_name = first_name.clone();
        }
        if let Some(last_name) = &update.last_name {
            self.last_name = last_name.clone();
        }
        self.updated_at = updated_at;
    }
}

/// DTO for creating a new user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl CreateUser {
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

/// DTO for a partial update; absent fields are left untouched in storage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UpdateUser {
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    /// No updatable field supplied
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.first_name.is_none() && self.last_name.is_none()
    }
}
