//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

#[cfg(test)]
use mockall::automock;

use super::entity::{NewUser, User, UserId};
use crate::domain::DomainError;

/// Repository trait for user storage
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Get a user by their ID
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Find all users registered with the given email
    async fn find_by_email(&self, email: &str) -> Result<Vec<User>, DomainError>;

    /// Persist a new user and return it with its assigned ID
    async fn create(&self, user: NewUser) -> Result<User, DomainError>;

    /// Update an existing user
    async fn update(&self, user: &User) -> Result<User, DomainError>;

    /// Delete a user, returning whether it existed
    async fn delete(&self, id: &UserId) -> Result<bool, DomainError>;

    /// Count stored users
    async fn count(&self) -> Result<usize, DomainError>;
}
