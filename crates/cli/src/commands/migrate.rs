//! Database migration command.
//!
//! ```bash
//! fp-cli migrate
//! ```
//!
//! Applies the embedded migrations from `crates/portal/migrations/` to the
//! database named by `PORTAL_DATABASE_URL`.

use super::{CliError, connect};

/// Run the portal database migrations.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running portal migrations...");
    flash_pagamentos_portal::db::MIGRATOR.run(&pool).await?;

    tracing::info!("Portal migrations complete!");
    Ok(())
}
