//! Users service
//!
//! A user account subsystem exposed over HTTP:
//! - Signup and signin with salted password credentials
//! - Lookup by ID or email, update and removal
//! - Cookie sessions holding the signed-in user's ID
//! - In-memory or PostgreSQL storage

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::middleware::SessionCookie;
use api::state::{AppState, AuthServiceTrait, UsersServiceTrait};
use domain::user::UserRepository;
use infrastructure::{
    auth::{JwtConfig, JwtSessionCodec},
    storage::{self, StorageConfig},
    user::{
        Argon2Hasher, AuthService, InMemoryUserRepository, PasswordHasher,
        PostgresUserRepository, UsersService,
    },
};
use tracing::{info, warn};

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let session_codec = Arc::new(JwtSessionCodec::new(config.session.jwt_config()?)?);
    let storage_config = config.storage.storage_config()?;
    info!("Storage backend: {:?}", storage_config.storage_type());

    let hasher = Arc::new(Argon2Hasher::new());

    let (users_service, auth_service) = match storage_config {
        StorageConfig::InMemory => {
            create_services(Arc::new(InMemoryUserRepository::new()), hasher)
        }
        StorageConfig::Postgres(pg_config) => {
            let pool = storage::connect(&pg_config).await?;
            create_services(Arc::new(PostgresUserRepository::new(pool)), hasher)
        }
    };

    if config.session.secret == JwtConfig::default().secret {
        warn!("Using the default session secret; set APP__SESSION__SECRET in production");
    }

    let session_cookie = SessionCookie {
        name: config.session.cookie_name.clone(),
        secure: config.session.secure,
    };

    Ok(AppState::new(
        users_service,
        auth_service,
        session_codec,
        session_cookie,
    ))
}

fn create_services<R, H>(
    repository: Arc<R>,
    hasher: Arc<H>,
) -> (Arc<dyn UsersServiceTrait>, Arc<dyn AuthServiceTrait>)
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
{
    let users_service = Arc::new(UsersService::new(repository));
    let auth_service = Arc::new(AuthService::new(users_service.clone(), hasher));

    (users_service, auth_service)
}
