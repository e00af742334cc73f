//! Signed session tokens carrying the signed-in user's ID

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::debug;

use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Session token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl SessionClaims {
    /// Create new claims for a user expiring after `lifetime`
    pub fn new(user_id: UserId, lifetime: Duration) -> Self {
        let now = Utc::now();
        let exp = now + lifetime;

        Self {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    /// Get the user ID from claims
    pub fn user_id(&self) -> Option<UserId> {
        self.sub.parse().ok()
    }
}

/// Longest accepted session lifetime (one year)
pub const MAX_EXPIRATION_HOURS: u64 = 8760;

/// Configuration for session tokens
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token expiration time in hours
    pub expiration_hours: u64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expiration_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours,
        }
    }

    /// Check that the lifetime is between one hour and [`MAX_EXPIRATION_HOURS`]
    pub fn validate(&self) -> Result<(), DomainError> {
        self.lifetime().map(|_| ())
    }

    fn lifetime(&self) -> Result<Duration, DomainError> {
        if !(1..=MAX_EXPIRATION_HOURS).contains(&self.expiration_hours) {
            return Err(DomainError::configuration(format!(
                "Session expiration must be between 1 and {} hours, got {}",
                MAX_EXPIRATION_HOURS, self.expiration_hours
            )));
        }

        i64::try_from(self.expiration_hours)
            .ok()
            .and_then(Duration::try_hours)
            .ok_or_else(|| {
                DomainError::configuration(format!(
                    "Session expiration of {} hours is out of range",
                    self.expiration_hours
                ))
            })
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            expiration_hours: 24,
        }
    }
}

/// Encodes and decodes the opaque session value
pub trait SessionCodec: Send + Sync + Debug {
    /// Produce a token for a signed-in user
    fn encode(&self, user_id: UserId) -> Result<String, DomainError>;

    /// Recover the user ID from a token; invalid or expired tokens yield `None`
    fn decode(&self, token: &str) -> Option<UserId>;

    /// Token lifetime in seconds
    fn max_age_secs(&self) -> i64;
}

/// HS256 session codec
#[derive(Clone)]
pub struct JwtSessionCodec {
    lifetime: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Debug for JwtSessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSessionCodec")
            .field("lifetime_secs", &self.lifetime.num_seconds())
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtSessionCodec {
    /// Build a codec; fails when the configured lifetime is out of range
    pub fn new(config: JwtConfig) -> Result<Self, DomainError> {
        let lifetime = config.lifetime()?;

        Ok(Self {
            lifetime,
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
        })
    }

    fn validate(&self, token: &str) -> Result<SessionClaims, DomainError> {
        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| DomainError::credential(format!("Invalid session token: {}", e)))?;

        Ok(token_data.claims)
    }
}

impl SessionCodec for JwtSessionCodec {
    fn encode(&self, user_id: UserId) -> Result<String, DomainError> {
        let claims = SessionClaims::new(user_id, self.lifetime);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to sign session token: {}", e)))
    }

    fn decode(&self, token: &str) -> Option<UserId> {
        match self.validate(token) {
            Ok(claims) => claims.user_id(),
            Err(e) => {
                debug!("Ignoring session token: {}", e);
                None
            }
        }
    }

    fn max_age_secs(&self) -> i64 {
        self.lifetime.num_seconds()
    }
}
