//! User validation utilities

use thiserror::Error;
use validator::ValidateEmail;

/// Maximum email length accepted at signup
pub const MAX_EMAIL_LENGTH: usize = 255;

/// Maximum password length accepted before hashing
pub const MAX_PASSWORD_LENGTH: usize = 1024;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("User ID must be a positive integer, got {0}")]
    NonPositiveId(i64),

    #[error("User ID '{0}' is not a number")]
    MalformedId(String),

    #[error("Email cannot be empty")]
    EmptyEmail,

    #[error("Email exceeds maximum length of {0} characters")]
    EmailTooLong(usize),

    #[error("Email '{0}' is not a valid address")]
    InvalidEmail(String),

    #[error("Password cannot be empty")]
    EmptyPassword,

    #[error("Password exceeds maximum length of {0} characters")]
    PasswordTooLong(usize),
}

/// Validate a raw user ID value
pub fn validate_user_id(id: i64) -> Result<(), UserValidationError> {
    if id <= 0 {
        return Err(UserValidationError::NonPositiveId(id));
    }

    Ok(())
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if email.is_empty() {
        return Err(UserValidationError::EmptyEmail);
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(UserValidationError::EmailTooLong(MAX_EMAIL_LENGTH));
    }

    if !email.validate_email() {
        return Err(UserValidationError::InvalidEmail(email.to_string()));
    }

    Ok(())
}

/// Validate a plaintext password before it is hashed
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.is_empty() {
        return Err(UserValidationError::EmptyPassword);
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_user_id() {
        assert!(validate_user_id(1).is_ok());
        assert!(validate_user_id(999_999).is_ok());
    }

    #[test]
    fn test_invalid_user_id() {
        assert_eq!(
            validate_user_id(0),
            Err(UserValidationError::NonPositiveId(0))
        );
        assert!(validate_user_id(-4).is_err());
    }

    #[test]
    fn test_valid_emails() {
        assert!(validate_email("john@example.com").is_ok());
        assert!(validate_email("naruto@shippuden.tv").is_ok());
        assert!(validate_email("first.last+tag@sub.domain.org").is_ok());
    }

    #[test]
    fn test_invalid_emails() {
        assert_eq!(validate_email(""), Err(UserValidationError::EmptyEmail));
        assert!(matches!(
            validate_email("not-an-email"),
            Err(UserValidationError::InvalidEmail(_))
        ));
        assert!(validate_email("missing@").is_err());

        let long = format!("{}@example.com", "a".repeat(MAX_EMAIL_LENGTH));
        assert_eq!(
            validate_email(&long),
            Err(UserValidationError::EmailTooLong(MAX_EMAIL_LENGTH))
        );
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("n15rr35").is_ok());
        assert_eq!(validate_password(""), Err(UserValidationError::EmptyPassword));

        let long = "x".repeat(MAX_PASSWORD_LENGTH + 1);
        assert_eq!(
            validate_password(&long),
            Err(UserValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH))
        );
    }
}
