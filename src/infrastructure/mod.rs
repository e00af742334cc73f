//! Infrastructure layer - storage, credentials and session implementations

pub mod auth;
pub mod logging;
pub mod storage;
pub mod user;
