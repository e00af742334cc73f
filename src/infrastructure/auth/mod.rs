//! Authentication infrastructure module
//!
//! This module provides signed session tokens for keeping users signed in.

mod jwt;

pub use jwt::{JwtConfig, JwtSessionCodec, SessionClaims, SessionCodec, MAX_EXPIRATION_HOURS};
