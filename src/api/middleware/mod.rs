//! API middleware components

pub mod logging;
pub mod session;
pub mod user_auth;

pub use logging::logging_middleware;
pub use session::{find_cookie, Session, SessionCookie};
pub use user_auth::RequireUser;
