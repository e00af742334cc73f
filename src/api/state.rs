//! Application state for shared services

use std::sync::Arc;

use crate::api::middleware::SessionCookie;
use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::auth::SessionCodec;
use crate::infrastructure::user::{AuthService, PasswordHasher, UserChanges, UsersService};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub users_service: Arc<dyn UsersServiceTrait>,
    pub auth_service: Arc<dyn AuthServiceTrait>,
    pub session_codec: Arc<dyn SessionCodec>,
    pub session_cookie: SessionCookie,
}

impl AppState {
    pub fn new(
        users_service: Arc<dyn UsersServiceTrait>,
        auth_service: Arc<dyn AuthServiceTrait>,
        session_codec: Arc<dyn SessionCodec>,
        session_cookie: SessionCookie,
    ) -> Self {
        Self {
            users_service,
            auth_service,
            session_codec,
            session_cookie,
        }
    }
}

/// Trait for users data access
#[async_trait::async_trait]
pub trait UsersServiceTrait: Send + Sync {
    async fn find(&self, email: &str) -> Result<Vec<User>, DomainError>;
    async fn find_one(&self, id: UserId) -> Result<Option<User>, DomainError>;
    async fn remove(&self, id: UserId) -> Result<User, DomainError>;
    async fn count(&self) -> Result<usize, DomainError>;
}

/// Trait for authentication operations
#[async_trait::async_trait]
pub trait AuthServiceTrait: Send + Sync {
    async fn signup(&self, email: &str, password: &str) -> Result<User, DomainError>;
    async fn signin(&self, email: &str, password: &str) -> Result<User, DomainError>;
    async fn update(&self, id: UserId, changes: UserChanges) -> Result<User, DomainError>;
}

// Implement traits for the actual services

#[async_trait::async_trait]
impl<R: UserRepository + 'static> UsersServiceTrait for UsersService<R> {
    async fn find(&self, email: &str) -> Result<Vec<User>, DomainError> {
        UsersService::find(self, email).await
    }

    async fn find_one(&self, id: UserId) -> Result<Option<User>, DomainError> {
        UsersService::find_one(self, id).await
    }

    async fn remove(&self, id: UserId) -> Result<User, DomainError> {
        UsersService::remove(self, id).await
    }

    async fn count(&self) -> Result<usize, DomainError> {
        UsersService::count(self).await
    }
}

#[async_trait::async_trait]
impl<R, H> AuthServiceTrait for AuthService<R, H>
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
{
    async fn signup(&self, email: &str, password: &str) -> Result<User, DomainError> {
        AuthService::signup(self, email, password).await
    }

    async fn signin(&self, email: &str, password: &str) -> Result<User, DomainError> {
        AuthService::signin(self, email, password).await
    }

    async fn update(&self, id: UserId, changes: UserChanges) -> Result<User, DomainError> {
        AuthService::update(self, id, changes).await
    }
}
