//! Credentials file import command.
//!
//! ```bash
//! fp-cli seed --file config.yaml
//! ```
//!
//! Imports the legacy YAML credentials file into the user store, hashing
//! cleartext passwords and skipping records that are already present. The
//! file is the migration seed of the old system, not a live database.

use std::path::Path;

use flash_pagamentos_portal::seed::CredentialsFile;

use super::{CliError, connect};

/// Import a legacy credentials file.
pub async fn run(file: &str) -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!(file, "Loading credentials file...");
    let credentials = CredentialsFile::load(Path::new(file))?;

    let outcome = credentials.import(&pool).await?;
    tracing::info!(
        imported = outcome.imported,
        skipped = outcome.skipped,
        "Seed import complete"
    );

    Ok(())
}
