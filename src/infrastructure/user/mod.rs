//! User infrastructure module
//!
//! This module provides implementations for user accounts and authentication,
//! including salted password hashing with Argon2, in-memory and PostgreSQL
//! repositories, the users data-access service, and the authentication service.

mod auth;
mod password;
mod postgres_repository;
mod repository;
mod service;

pub use auth::{AuthService, UserChanges};
pub use password::{split_credential, Argon2Hasher, PasswordHasher, DIGEST_BYTES, SALT_BYTES};
pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
pub use service::UsersService;

#[cfg(test)]
pub(crate) use password::test_hasher;
