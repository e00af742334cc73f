//! Signed-in user guard

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::User;

use super::session::Session;

/// Extractor that requires a signed-in user
///
/// Resolves the session's user ID through the users service. Requests
/// without a session, or whose user no longer exists, are rejected with
/// 403 Forbidden.
#[derive(Debug, Clone)]
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_headers(&parts.headers, state);

        let user_id = session.user_id().ok_or_else(|| {
            debug!("Rejecting request without a session");
            ApiError::forbidden("Sign in required")
        })?;

        let user = state
            .users_service
            .find_one(user_id)
            .await?
            .ok_or_else(|| {
                debug!(user_id = %user_id, "Session refers to a missing user");
                ApiError::forbidden("Sign in required")
            })?;

        Ok(RequireUser(user))
    }
}
