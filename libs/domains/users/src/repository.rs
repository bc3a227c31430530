use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::UserResult;
use crate::models::{UpdateUser, User};

/// Storage port for the `users` table.
///
/// Plain writes (`update`, `delete`) behave like the store's native statements:
/// they do not report whether the row existed. The `*_if_exists` variants are
/// compare-and-set writes that do.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Every user, in whatever order the store returns them
    async fn list(&self) -> UserResult<Vec<User>>;

    /// Get a user by ID
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// All users with this email (email is indexed, not unique)
    async fn find_by_email(&self, email: &str) -> UserResult<Vec<User>>;

    /// Persist a fully built user
    async fn insert(&self, user: &User) -> UserResult<()>;

    /// Write the supplied fields and `updated_at` for `id`
    async fn update(
        &self,
        id: Uuid,
        changes: &UpdateUser,
        updated_at: DateTime<Utc>,
    ) -> UserResult<()>;

    /// Like `update`, but only applied when the row exists; returns whether it was
    async fn update_if_exists(
        &self,
        id: Uuid,
        changes: &UpdateUser,
        updated_at: DateTime<Utc>,
    ) -> UserResult<bool>;

    /// Remove the row for `id`
    async fn delete(&self, id: Uuid) -> UserResult<()>;

    /// Remove the row only when it exists; returns whether it did
    async fn delete_if_exists(&self, id: Uuid) -> UserResult<bool>;
}

/// In-memory implementation of UserRepository (for development/testing)
///
/// Writes to a missing id are dropped rather than creating partial rows.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self) -> UserResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.values().cloned().collect())
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.values().filter(|u| u.email == email).cloned().collect())
    }

    async fn insert(&self, user: &User) -> UserResult<()> {
        let mut users = self.users.write().await;
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &UpdateUser,
        updated_at: DateTime<Utc>,
    ) -> UserResult<()> {
        self.update_if_exists(id, changes, updated_at).await?;
        Ok(())
    }

    async fn update_if_exists(
        &self,
        id: Uuid,
        changes: &UpdateUser,
        updated_at: DateTime<Utc>,
    ) -> UserResult<bool> {
        let mut users = self.users.write().await;
        match users.get_mut(&id) {
            Some(user) => {
                user.apply_update(changes, updated_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> UserResult<()> {
        self.delete_if_exists(id).await?;
        Ok(())
    }

    async fn delete_if_exists(&self, id: Uuid) -> UserResult<bool> {
        let mut users = self.users.write().await;
        Ok(users.remove(&id).is_some())
    }
}
