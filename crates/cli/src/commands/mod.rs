//! CLI command implementations.

pub mod migrate;
pub mod seed;
pub mod user;

use secrecy::SecretString;
use sqlx::SqlitePool;
use thiserror::Error;

/// Errors shared by the CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Credentials file error.
    #[error("Credentials file error: {0}")]
    Seed(#[from] flash_pagamentos_portal::seed::SeedError),

    /// Registration error.
    #[error("{0}")]
    Auth(#[from] flash_pagamentos_portal::services::auth::AuthError),

    /// Invalid role name.
    #[error("Invalid role: {0}. Valid roles: admin, parceiro, cliente")]
    InvalidRole(String),
}

/// Connect to the portal database named by `PORTAL_DATABASE_URL`
/// (fallback `DATABASE_URL`).
pub async fn connect() -> Result<SqlitePool, CliError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("PORTAL_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CliError::MissingEnvVar("PORTAL_DATABASE_URL"))?;

    tracing::info!("Connecting to portal database...");
    let pool = flash_pagamentos_portal::db::create_pool(&SecretString::from(database_url)).await?;
    Ok(pool)
}
