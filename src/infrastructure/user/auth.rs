//! Authentication service for signup, signin and credential changes

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::user::{validate_email, validate_password, User, UserId, UserRepository};
use crate::domain::DomainError;

use super::password::PasswordHasher;
use super::service::UsersService;

/// Requested changes to an existing user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none()
    }
}

/// Authentication service: salted credentials over the users service
#[derive(Debug)]
pub struct AuthService<R: UserRepository, H: PasswordHasher> {
    users: Arc<UsersService<R>>,
    hasher: Arc<H>,
}

impl<R: UserRepository, H: PasswordHasher> AuthService<R, H> {
    /// Create a new authentication service
    pub fn new(users: Arc<UsersService<R>>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }

    /// Register a new user with a salted password credential
    pub async fn signup(&self, email: &str, password: &str) -> Result<User, DomainError> {
        validate_email(email).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(password).map_err(|e| DomainError::validation(e.to_string()))?;

        if !self.users.find(email).await?.is_empty() {
            debug!("Signup rejected: email already registered");
            return Err(DomainError::duplicate_email(email));
        }

        let credential = self.hasher.hash(password)?;
        let user = self.users.create(email, &credential).await?;

        info!(user_id = %user.id(), "User signed up");
        Ok(user)
    }

    /// Authenticate a user by email and password
    pub async fn signin(&self, email: &str, password: &str) -> Result<User, DomainError> {
        let user = self
            .users
            .find(email)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", email)))?;

        if !self.hasher.verify(password, user.password()) {
            warn!(user_id = %user.id(), "Signin rejected: invalid credential");
            return Err(DomainError::invalid_credential());
        }

        info!(user_id = %user.id(), "User signed in");
        Ok(user)
    }

    /// Apply email and/or password changes, re-salting any new password
    pub async fn update(&self, id: UserId, changes: UserChanges) -> Result<User, DomainError> {
        let mut user = self
            .users
            .find_one(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))?;

        if let Some(email) = changes.email {
            validate_email(&email).map_err(|e| DomainError::validation(e.to_string()))?;

            let taken = self
                .users
                .find(&email)
                .await?
                .iter()
                .any(|other| other.id() != id);

            if taken {
                return Err(DomainError::duplicate_email(&email));
            }

            user.set_email(email);
        }

        if let Some(password) = changes.password {
            validate_password(&password).map_err(|e| DomainError::validation(e.to_string()))?;
            user.set_password(self.hasher.hash(&password)?);
        }

        let updated = self.users.update(&user).await?;
        info!(user_id = %id, "User updated");
        Ok(updated)
    }
}
