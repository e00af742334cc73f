//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{NewUser, User, UserId, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<UserId, User>,
    /// Index for email -> user ID lookup
    email_index: HashMap<String, UserId>,
    last_id: i64,
}

/// In-memory implementation of UserRepository
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository with initial users
    pub fn with_users(users: Vec<User>) -> Self {
        let mut inner = Inner::default();

        for user in users {
            inner.last_id = inner.last_id.max(user.id().value());
            inner.email_index.insert(user.email().to_string(), user.id());
            inner.users.insert(user.id(), user);
        }

        Self {
            inner: Arc::new(RwLock::new(inner)),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<User>, DomainError> {
        let inner = self.inner.read().await;

        let found = inner
            .email_index
            .get(email)
            .and_then(|id| inner.users.get(id))
            .cloned();

        Ok(found.into_iter().collect())
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut inner = self.inner.write().await;

        if inner.email_index.contains_key(&user.email) {
            return Err(DomainError::duplicate_email(&user.email));
        }

        let id = UserId::new(inner.last_id + 1)
            .map_err(|e| DomainError::internal(format!("Failed to assign user ID: {}", e)))?;
        inner.last_id = id.value();

        let created = User::new(id, user.email, user.password);
        inner.email_index.insert(created.email().to_string(), id);
        inner.users.insert(id, created.clone());

        Ok(created)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut inner = self.inner.write().await;
        let id = user.id();

        let old_email = match inner.users.get(&id) {
            Some(existing) => existing.email().to_string(),
            None => return Err(DomainError::not_found(format!("User '{}' not found", id))),
        };

        // If email changed, check uniqueness and update index
        if old_email != user.email() {
            if inner.email_index.contains_key(user.email()) {
                return Err(DomainError::duplicate_email(user.email()));
            }

            inner.email_index.remove(&old_email);
            inner.email_index.insert(user.email().to_string(), id);
        }

        inner.users.insert(id, user.clone());

        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        let mut inner = self.inner.write().await;

        if let Some(user) = inner.users.remove(id) {
            inner.email_index.remove(user.email());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner.users.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser::new(email, "salt.hash")
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = InMemoryUserRepository::new();

        let first = repo.create(new_user("a@example.com")).await.unwrap();
        let second = repo.create(new_user("b@example.com")).await.unwrap();

        assert_eq!(first.id().value(), 1);
        assert_eq!(second.id().value(), 2);
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("john@example.com")).await.unwrap();

        let retrieved = repo.get(&user.id()).await.unwrap();
        assert_eq!(retrieved, Some(user));
    }

    #[tokio::test]
    async fn test_find_by_email() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("john@example.com")).await.unwrap();

        let found = repo.find_by_email("john@example.com").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].email(), "john@example.com");

        let missing = repo.find_by_email("nobody@example.com").await.unwrap();
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_email_uniqueness() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("dup@example.com")).await.unwrap();

        let result = repo.create(new_user("dup@example.com")).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_update_reindexes_email() {
        let repo = InMemoryUserRepository::new();
        let mut user = repo.create(new_user("old@example.com")).await.unwrap();

        user.set_email("new@example.com");
        repo.update(&user).await.unwrap();

        assert!(repo.find_by_email("old@example.com").await.unwrap().is_empty());
        assert_eq!(repo.find_by_email("new@example.com").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_rejects_taken_email() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("taken@example.com")).await.unwrap();
        let mut user = repo.create(new_user("mine@example.com")).await.unwrap();

        user.set_email("taken@example.com");
        let result = repo.update(&user).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let repo = InMemoryUserRepository::new();
        let ghost = User::new(UserId::new(9).unwrap(), "ghost@example.com", "s.h");

        let result = repo.update(&ghost).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("gone@example.com")).await.unwrap();

        assert!(repo.delete(&user.id()).await.unwrap());
        assert!(!repo.delete(&user.id()).await.unwrap());
        assert!(repo.get(&user.id()).await.unwrap().is_none());
        assert!(repo.find_by_email("gone@example.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let repo = InMemoryUserRepository::new();
        let first = repo.create(new_user("a@example.com")).await.unwrap();
        repo.delete(&first.id()).await.unwrap();

        let second = repo.create(new_user("b@example.com")).await.unwrap();
        assert_eq!(second.id().value(), 2);
    }

    #[tokio::test]
    async fn test_with_users_and_count() {
        let seeded = vec![
            User::new(UserId::new(5).unwrap(), "five@example.com", "s.h"),
            User::new(UserId::new(2).unwrap(), "two@example.com", "s.h"),
        ];
        let repo = InMemoryUserRepository::with_users(seeded);

        assert_eq!(repo.count().await.unwrap(), 2);

        let next = repo.create(new_user("six@example.com")).await.unwrap();
        assert_eq!(next.id().value(), 6);
    }
}
