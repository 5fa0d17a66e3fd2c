//! Legacy YAML credentials file: loading and import.
//!
//! The production system used `config.yaml` as its user database
//! (full-file rewrite on every registration). Here it is a migration seed:
//! `fp-cli seed` (or the startup bootstrap) imports its users into SQLite,
//! hashing each cleartext password on the way in. The file's `cookie` block
//! still drives the session cookie name and expiry; its signing key is
//! ignored in favor of the environment.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use flash_pagamentos_core::{CpfCnpj, Email, Role};

use crate::config::SessionConfig;
use crate::db::users::UserRepository;
use crate::models::NewUser;
use crate::services::auth::hash_password;

/// Default session cookie name when neither the environment nor the seed
/// file specifies one.
pub const DEFAULT_COOKIE_NAME: &str = "fp_session";

/// Default session expiry in days.
pub const DEFAULT_EXPIRY_DAYS: i64 = 30;

/// Errors loading or importing the credentials file.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The file exists but could not be read.
    #[error("could not read credentials file: {0}")]
    Io(#[from] std::io::Error),

    /// The file could not be decoded as YAML.
    #[error("could not decode credentials file: {0}")]
    Decode(#[from] serde_yaml::Error),

    /// The import hit a database error.
    #[error("import failed: {0}")]
    Repository(#[from] crate::db::RepositoryError),

    /// Password hashing failed for a seed record.
    #[error("could not hash seed password for '{0}'")]
    Hash(String),
}

/// The legacy file, verbatim: `credentials.users` plus a `cookie` block.
/// Every user field is a string, as the old system wrote them.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CredentialsFile {
    #[serde(default)]
    pub credentials: CredentialsSection,
    #[serde(default)]
    pub cookie: Option<CookieSettings>,
}

/// `credentials:` section.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CredentialsSection {
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

/// One user entry in the legacy file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SeedUser {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub whatsapp: String,
    #[serde(default)]
    pub endereco: String,
    #[serde(default)]
    pub cep: String,
    #[serde(default)]
    pub bairro: String,
    #[serde(default)]
    pub cidade: String,
    #[serde(default)]
    pub cpf_cnpj: String,
    #[serde(default)]
    pub created_at: String,
}

/// `cookie:` section of the legacy file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CookieSettings {
    pub name: String,
    #[serde(default)]
    pub key: String,
    pub expiry_days: i64,
}

/// Session cookie parameters after merging environment, seed file and
/// defaults (in that precedence order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCookie {
    pub name: String,
    pub expiry_days: i64,
}

/// Outcome of an import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Records inserted.
    pub imported: usize,
    /// Records skipped (already present or unusable).
    pub skipped: usize,
}

impl CredentialsFile {
    /// Load the credentials file.
    ///
    /// A missing file is an empty store, not an error; an unreadable or
    /// undecodable file is a configuration error the caller treats as fatal
    /// at startup.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::Io`] or [`SeedError::Decode`].
    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => return Err(SeedError::Io(e)),
        };

        Ok(serde_yaml::from_str(&raw)?)
    }

    /// Import the file's users into the credential store.
    ///
    /// Cleartext seed passwords are hashed on the way in (entries that
    /// already look like PHC strings are kept verbatim). Records whose email
    /// is already registered, or whose email/CPF/role cannot be parsed, are
    /// skipped with a warning rather than aborting the whole run.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::Repository`] on database failures.
    pub async fn import(&self, pool: &sqlx::SqlitePool) -> Result<ImportOutcome, SeedError> {
        let repo = UserRepository::new(pool);
        let mut outcome = ImportOutcome::default();

        for entry in &self.credentials.users {
            let Some(new_user) = prepare_seed_user(entry)? else {
                outcome.skipped += 1;
                continue;
            };

            if repo.get_by_email(&new_user.email).await?.is_some() {
                tracing::debug!(email = %new_user.email, "seed user already present, skipping");
                outcome.skipped += 1;
                continue;
            }

            repo.create(&new_user).await?;
            outcome.imported += 1;
        }

        if self
            .cookie
            .as_ref()
            .is_some_and(|cookie| !cookie.key.is_empty())
        {
            tracing::warn!(
                "credentials file carries a cookie signing key; it is ignored - \
                 set SESSION_SIGNING_KEY instead"
            );
        }

        Ok(outcome)
    }
}

/// Validate and convert one seed entry, or `None` if it is unusable.
fn prepare_seed_user(entry: &SeedUser) -> Result<Option<NewUser>, SeedError> {
    let email = match Email::parse(entry.email.trim()) {
        Ok(email) => email,
        Err(e) => {
            tracing::warn!(username = %entry.username, "skipping seed user with bad email: {e}");
            return Ok(None);
        }
    };
    let cpf_cnpj = match CpfCnpj::parse(&entry.cpf_cnpj) {
        Ok(cpf_cnpj) => cpf_cnpj,
        Err(e) => {
            tracing::warn!(username = %entry.username, "skipping seed user with bad cpf_cnpj: {e}");
            return Ok(None);
        }
    };
    let role: Role = match entry.role.parse() {
        Ok(role) => role,
        Err(e) => {
            tracing::warn!(username = %entry.username, "skipping seed user: {e}");
            return Ok(None);
        }
    };

    // Legacy files hold cleartext; never store it that way.
    let password_hash = if entry.password.starts_with("$argon2") {
        entry.password.clone()
    } else {
        hash_password(&entry.password).map_err(|_| SeedError::Hash(entry.username.clone()))?
    };

    let created_at = entry
        .created_at
        .parse::<chrono::DateTime<chrono::Utc>>()
        .unwrap_or_else(|_| chrono::Utc::now());

    Ok(Some(NewUser {
        username: entry.username.trim().to_string(),
        name: entry.name.trim().to_string(),
        email,
        password_hash,
        role,
        whatsapp: entry.whatsapp.clone(),
        address: entry.endereco.clone(),
        postal_code: entry.cep.clone(),
        district: entry.bairro.clone(),
        city: entry.cidade.clone(),
        cpf_cnpj,
        created_at,
    }))
}

/// Merge cookie settings: environment overrides the seed file, which
/// overrides the defaults.
#[must_use]
pub fn resolve_cookie(session: &SessionConfig, seed: Option<&CookieSettings>) -> ResolvedCookie {
    ResolvedCookie {
        name: session
            .cookie_name
            .clone()
            .or_else(|| seed.map(|c| c.name.clone()))
            .unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string()),
        expiry_days: session
            .expiry_days
            .or(seed.map(|c| c.expiry_days))
            .unwrap_or(DEFAULT_EXPIRY_DAYS),
    }
}
