//! Cookie-backed session holding the signed-in user's ID

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{
        header::{self, HeaderMap, HeaderValue},
        request::Parts,
    },
    response::{IntoResponseParts, ResponseParts},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::UserId;
use crate::infrastructure::auth::SessionCodec;

/// Session cookie attributes
#[derive(Debug, Clone)]
pub struct SessionCookie {
    pub name: String,
    pub secure: bool,
}

impl Default for SessionCookie {
    fn default() -> Self {
        Self {
            name: "session".to_string(),
            secure: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionChange {
    SignedIn(UserId),
    SignedOut,
}

/// Request session
///
/// Extracted from the session cookie; a missing, tampered or expired cookie
/// yields an empty session. Returning the session from a handler writes
/// `Set-Cookie` only when it was changed with [`Session::sign_in`] or
/// [`Session::sign_out`].
#[derive(Debug, Clone)]
pub struct Session {
    user_id: Option<UserId>,
    change: Option<SessionChange>,
    codec: Arc<dyn SessionCodec>,
    cookie: SessionCookie,
}

impl Session {
    pub fn new(
        user_id: Option<UserId>,
        codec: Arc<dyn SessionCodec>,
        cookie: SessionCookie,
    ) -> Self {
        Self {
            user_id,
            change: None,
            codec,
            cookie,
        }
    }

    /// Build the session for a request's headers
    pub fn from_headers(headers: &HeaderMap, state: &AppState) -> Self {
        let user_id = find_cookie(headers, &state.session_cookie.name)
            .and_then(|token| state.session_codec.decode(token));

        Self::new(
            user_id,
            state.session_codec.clone(),
            state.session_cookie.clone(),
        )
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn sign_in(&mut self, user_id: UserId) {
        self.user_id = Some(user_id);
        self.change = Some(SessionChange::SignedIn(user_id));
    }

    pub fn sign_out(&mut self) {
        self.user_id = None;
        self.change = Some(SessionChange::SignedOut);
    }

    pub fn is_changed(&self) -> bool {
        self.change.is_some()
    }

    fn set_cookie_value(&self, change: SessionChange) -> Result<String, ApiError> {
        let (value, max_age) = match change {
            SessionChange::SignedIn(user_id) => {
                (self.codec.encode(user_id)?, self.codec.max_age_secs())
            }
            SessionChange::SignedOut => (String::new(), 0),
        };

        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.cookie.name, value, max_age
        );
        if self.cookie.secure {
            cookie.push_str("; Secure");
        }

        Ok(cookie)
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Session::from_headers(&parts.headers, state))
    }
}

impl IntoResponseParts for Session {
    type Error = ApiError;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        let Some(change) = self.change else {
            return Ok(res);
        };

        let cookie = self.set_cookie_value(change)?;
        let value = HeaderValue::from_str(&cookie)
            .map_err(|e| ApiError::internal(format!("Invalid session cookie: {}", e)))?;

        debug!(signed_in = self.user_id.is_some(), "Updating session cookie");
        res.headers_mut().append(header::SET_COOKIE, value);
        Ok(res)
    }
}

/// Find a cookie value by name across all `Cookie` headers
pub fn find_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::auth::{JwtConfig, JwtSessionCodec};
    use axum::response::{IntoResponse, Response};

    fn codec() -> Arc<dyn SessionCodec> {
        Arc::new(JwtSessionCodec::new(JwtConfig::new("session-test", 1)).unwrap())
    }

    fn render(session: Session) -> Response {
        (session, "ok").into_response()
    }

    #[test]
    fn test_find_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "theme=dark; session=abc.def".parse().unwrap());

        assert_eq!(find_cookie(&headers, "session"), Some("abc.def"));
        assert_eq!(find_cookie(&headers, "theme"), Some("dark"));
        assert_eq!(find_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_find_cookie_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, "theme=dark".parse().unwrap());
        headers.append(header::COOKIE, "session=token".parse().unwrap());

        assert_eq!(find_cookie(&headers, "session"), Some("token"));
    }

    #[test]
    fn test_empty_cookie_value_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "session=".parse().unwrap());

        assert_eq!(find_cookie(&headers, "session"), None);
    }

    #[test]
    fn test_unchanged_session_sets_no_cookie() {
        let id = UserId::new(3).unwrap();
        let session = Session::new(Some(id), codec(), SessionCookie::default());

        let response = render(session);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[test]
    fn test_sign_in_sets_decodable_cookie() {
        let codec = codec();
        let mut session = Session::new(None, codec.clone(), SessionCookie::default());
        let id = UserId::new(3).unwrap();

        session.sign_in(id);
        assert_eq!(session.user_id(), Some(id));
        assert!(session.is_changed());

        let response = render(session);
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("session="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(!cookie.contains("Secure"));

        let token = cookie
            .trim_start_matches("session=")
            .split(';')
            .next()
            .unwrap();
        assert_eq!(codec.decode(token), Some(id));
    }

    #[test]
    fn test_sign_out_clears_cookie() {
        let id = UserId::new(3).unwrap();
        let cookie = SessionCookie {
            name: "sid".to_string(),
            secure: true,
        };
        let mut session = Session::new(Some(id), codec(), cookie);

        session.sign_out();
        assert_eq!(session.user_id(), None);

        let response = render(session);
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("sid=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("Secure"));
    }
}
