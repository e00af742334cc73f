//! User domain
//!
//! This module provides domain types and traits for user accounts,
//! including the user entity, validation, and the repository trait.

mod entity;
mod repository;
mod validation;

pub use entity::{NewUser, User, UserId};
pub use repository::UserRepository;
pub use validation::{
    validate_email, validate_password, validate_user_id, UserValidationError, MAX_EMAIL_LENGTH,
    MAX_PASSWORD_LENGTH,
};

#[cfg(test)]
pub use repository::MockUserRepository;
