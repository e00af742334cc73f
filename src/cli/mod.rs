//! CLI module for the users service
//!
//! Provides subcommands:
//! - `serve`: run the HTTP API
//! - `migrate`: apply PostgreSQL migrations and exit

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Users service - account signup, signin and lookup over HTTP
#[derive(Parser)]
#[command(name = "users-service")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve(serve::ServeArgs),

    /// Apply PostgreSQL migrations and exit
    Migrate,
}

/// Load configuration and install logging shared by every command
fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    Ok(config)
}
