//! Users service - data access for user records

use std::sync::Arc;

use tracing::debug;

use crate::domain::user::{NewUser, User, UserId, UserRepository};
use crate::domain::DomainError;

/// Users service wrapping the repository with not-found semantics
#[derive(Debug)]
pub struct UsersService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UsersService<R> {
    /// Create a new users service
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Find all users registered with an email
    pub async fn find(&self, email: &str) -> Result<Vec<User>, DomainError> {
        self.repository.find_by_email(email).await
    }

    /// Find a user by ID
    pub async fn find_one(&self, id: UserId) -> Result<Option<User>, DomainError> {
        self.repository.get(&id).await
    }

    /// Persist a new user; `password` must already be a salted credential
    pub async fn create(&self, email: &str, password: &str) -> Result<User, DomainError> {
        let user = self.repository.create(NewUser::new(email, password)).await?;
        debug!(user_id = %user.id(), "User record created");
        Ok(user)
    }

    /// Persist changes to an existing user
    pub async fn update(&self, user: &User) -> Result<User, DomainError> {
        self.repository.update(user).await
    }

    /// Remove a user, returning the removed record
    pub async fn remove(&self, id: UserId) -> Result<User, DomainError> {
        let user = self
            .repository
            .get(&id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))?;

        if !self.repository.delete(&id).await? {
            return Err(DomainError::not_found(format!("User '{}' not found", id)));
        }

        debug!(user_id = %id, "User record removed");
        Ok(user)
    }

    /// Count stored users
    pub async fn count(&self) -> Result<usize, DomainError> {
        self.repository.count().await
    }
}
