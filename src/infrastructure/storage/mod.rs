//! Storage infrastructure - backend selection, PostgreSQL pooling and migrations

mod factory;
pub mod migrations;
mod postgres;

pub use factory::{StorageConfig, StorageType};
pub use migrations::{run_user_migrations, Migration, PostgresMigrator};
pub use postgres::{connect, PostgresConfig};
