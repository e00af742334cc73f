//! Authentication and user endpoints
//!
//! Signup and signin store the user's ID in the session cookie; the lookup,
//! update and delete endpoints work on user records by ID or email.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::{RequireUser, Session};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::user::{User, UserId};
use crate::domain::DomainError;
use crate::infrastructure::user::UserChanges;

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/", get(find_all_users))
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/signout", post(signout))
        .route("/whoami", get(whoami))
        .route(
            "/{id}",
            get(find_user).patch(update_user).delete(remove_user),
        )
}

/// Signup and signin body
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Partial update body
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(request: UpdateUserRequest) -> Self {
        Self {
            email: request.email,
            password: request.password,
        }
    }
}

/// `email` is optional here so a missing one is reported in the API error format
#[derive(Debug, Default, Deserialize)]
pub struct FindUsersQuery {
    pub email: Option<String>,
}

/// User response (safe to expose)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().value(),
            email: user.email().to_string(),
        }
    }
}

fn parse_id(raw: &str) -> Result<UserId, ApiError> {
    raw.parse::<UserId>()
        .map_err(|e| DomainError::invalid_id(e.to_string()).into())
}

/// POST /auth/signup
pub async fn signup(
    State(state): State<AppState>,
    mut session: Session,
    Json(request): Json<CredentialsRequest>,
) -> Result<(StatusCode, Session, Json<UserResponse>), ApiError> {
    let user = state
        .auth_service
        .signup(&request.email, &request.password)
        .await?;

    session.sign_in(user.id());
    Ok((StatusCode::CREATED, session, Json(UserResponse::from(&user))))
}

/// POST /auth/signin
pub async fn signin(
    State(state): State<AppState>,
    mut session: Session,
    Json(request): Json<CredentialsRequest>,
) -> Result<(Session, Json<UserResponse>), ApiError> {
    let user = state
        .auth_service
        .signin(&request.email, &request.password)
        .await?;

    session.sign_in(user.id());
    Ok((session, Json(UserResponse::from(&user))))
}

/// POST /auth/signout
pub async fn signout(mut session: Session) -> (Session, StatusCode) {
    if let Some(user_id) = session.user_id() {
        debug!(user_id = %user_id, "User signed out");
    }

    session.sign_out();
    (session, StatusCode::NO_CONTENT)
}

/// GET /auth/whoami
pub async fn whoami(RequireUser(user): RequireUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}

/// GET /auth/{id}
pub async fn find_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_id(&id)?;

    let user = state
        .users_service
        .find_one(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User '{}' not found", id)))?;

    Ok(Json(UserResponse::from(&user)))
}

/// GET /auth?email=
pub async fn find_all_users(
    State(state): State<AppState>,
    Query(query): Query<FindUsersQuery>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let email = query.email.ok_or_else(|| {
        ApiError::bad_request("Query parameter 'email' is required").with_param("email")
    })?;

    let users = state.users_service.find(&email).await?;

    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// PATCH /auth/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_id(&id)?;

    let user = state.auth_service.update(id, request.into()).await?;

    Ok(Json(UserResponse::from(&user)))
}

/// DELETE /auth/{id}
pub async fn remove_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_id(&id)?;

    let user = state.users_service.remove(id).await?;

    Ok(Json(UserResponse::from(&user)))
}
