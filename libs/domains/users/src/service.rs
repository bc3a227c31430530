use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, UpdateUser, User, store_timestamp_now};
use crate::repository::UserRepository;

/// How `update_user` / `delete_user` establish that the row exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Read the row first, then issue a plain write. A concurrent delete between the
    /// two round trips is not detected.
    #[default]
    BestEffort,
    /// Single compare-and-set write (`IF EXISTS`) that reports whether it applied.
    Conditional,
}

/// Service-call interface for users.
///
/// Owns id generation and timestamp stamping; callers only ever supply
/// email, first name and last name.
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    write_mode: WriteMode,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self::from_arc(Arc::new(repository))
    }

    pub fn from_arc(repository: Arc<R>) -> Self {
        Self {
            repository,
            write_mode: WriteMode::default(),
        }
    }

    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    pub fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    /// All users, unordered and unpaginated
    #[instrument(name = "users.service.get_all_users", skip(self))]
    pub async fn get_all_users(&self) -> UserResult<Vec<User>> {
        self.repository.list().await
    }

    /// `None` when no user has this id; `InvalidArgument` when `id` is not a UUID
    #[instrument(name = "users.service.get_user_by_id", skip(self))]
    pub async fn get_user_by_id(&self, id: &str) -> UserResult<Option<User>> {
        let id = parse_user_id(id)?;
        self.repository.get_by_id(id).await
    }

    /// Users sharing this email, via the email index
    #[instrument(name = "users.service.find_users_by_email", skip(self, email))]
    pub async fn find_users_by_email(&self, email: &str) -> UserResult<Vec<User>> {
        if email.trim().is_empty() {
            return Err(UserError::invalid_argument("email must not be empty"));
        }
        self.repository.find_by_email(email).await
    }

    /// Create a user with a fresh random id and one timestamp for created/updated.
    ///
    /// The returned record is built locally, not read back.
    #[instrument(name = "users.service.create_user", skip(self, input))]
    pub async fn create_user(&self, input: CreateUser) -> UserResult<User> {
        let user = User::new(Uuid::new_v4(), input, store_timestamp_now());

        self.repository.insert(&user).await?;

        info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    /// Apply the supplied fields, refresh `updated_at` and return the stored row.
    ///
    /// `None` when the user does not exist; no write is issued in that case.
    /// An update with no fields is rejected with `InvalidArgument`.
    #[instrument(name = "users.service.update_user", skip(self, changes))]
    pub async fn update_user(&self, id: &str, changes: UpdateUser) -> UserResult<Option<User>> {
        let id = parse_user_id(id)?;
        if changes.is_empty() {
            return Err(UserError::invalid_argument(
                "at least one of email, firstName or lastName must be supplied",
            ));
        }

        let applied = match self.write_mode {
            WriteMode::BestEffort => {
                let Some(existing) = self.repository.get_by_id(id).await? else {
                    debug!(user_id = %id, "User not found, skipping update");
                    return Ok(None);
                };
                // Never move updated_at backwards, even if the clock did
                let updated_at = store_timestamp_now().max(existing.updated_at);
                self.repository.update(id, &changes, updated_at).await?;
                true
            }
            WriteMode::Conditional => {
                self.repository
                    .update_if_exists(id, &changes, store_timestamp_now())
                    .await?
            }
        };

        if !applied {
            debug!(user_id = %id, "User not found, update not applied");
            return Ok(None);
        }

        info!(user_id = %id, "Updated user");
        self.repository.get_by_id(id).await
    }

    /// `true` when the user existed and was removed, `false` when there was nothing to delete
    #[instrument(name = "users.service.delete_user", skip(self))]
    pub async fn delete_user(&self, id: &str) -> UserResult<bool> {
        let id = parse_user_id(id)?;

        let deleted = match self.write_mode {
            WriteMode::BestEffort => {
                if self.repository.get_by_id(id).await?.is_none() {
                    false
                } else {
                    self.repository.delete(id).await?;
                    true
                }
            }
            WriteMode::Conditional => self.repository.delete_if_exists(id).await?,
        };

        if deleted {
            info!(user_id = %id, "Deleted user");
        } else {
            debug!(user_id = %id, "User not found, nothing deleted");
        }
        Ok(deleted)
    }
}

/// Parse a caller-supplied id before it reaches the store
pub fn parse_user_id(id: &str) -> UserResult<Uuid> {
    Uuid::parse_str(id)
        .map_err(|_| UserError::invalid_argument(format!("'{}' is not a valid user id", id)))
}
