//! User repository - the credential store.
//!
//! Records are inserted by the registration flow and the seed importer and
//! never mutated or deleted afterwards. Uniqueness of username and email is
//! enforced by the schema, so concurrent registrations serialize inside
//! SQLite instead of racing over a shared file.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use flash_pagamentos_core::{CpfCnpj, Email, Role, UserId};

use super::RepositoryError;
use crate::models::{NewUser, User};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    whatsapp: String,
    address: String,
    postal_code: String,
    district: String,
    city: String,
    cpf_cnpj: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let cpf_cnpj = CpfCnpj::parse(&row.cpf_cnpj).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid cpf_cnpj in database: {e}"))
        })?;
        let role: Role = row.role.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            username: row.username,
            name: row.name,
            email,
            password_hash: row.password_hash,
            role,
            whatsapp: row.whatsapp,
            address: row.address,
            postal_code: row.postal_code,
            district: row.district,
            city: row.city,
            cpf_cnpj,
            created_at: row.created_at,
        })
    }
}

const SELECT_COLUMNS: &str = "id, username, name, email, password_hash, role, whatsapp, \
                              address, postal_code, district, city, cpf_cnpj, created_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List all users, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored field is invalid.
    pub async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM users ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a user by their login name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored field is invalid.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM users WHERE username = ?1"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored field is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM users WHERE email = ?1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Insert a validated user record.
    ///
    /// The insert is a single statement; either the whole record lands or
    /// nothing does.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or username is
    /// already registered, `RepositoryError::Database` otherwise.
    pub async fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (username, name, email, password_hash, role, whatsapp, \
             address, postal_code, district, city, cpf_cnpj, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12) \
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(&new_user.username)
        .bind(&new_user.name)
        .bind(new_user.email.as_str())
        .bind(&new_user.password_hash)
        .bind(new_user.role.as_str())
        .bind(&new_user.whatsapp)
        .bind(&new_user.address)
        .bind(&new_user.postal_code)
        .bind(&new_user.district)
        .bind(&new_user.city)
        .bind(new_user.cpf_cnpj.as_str())
        .bind(new_user.created_at)
        .fetch_one(self.pool)
        .await
        .map_err(map_unique_violation)?;

        row.try_into()
    }

    /// Count registered users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

/// Translate a UNIQUE-constraint failure into a `Conflict` naming the field.
fn map_unique_violation(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let message = db_err.message();
            let field = if message.contains("users.email") {
                "email already registered"
            } else if message.contains("users.username") {
                "username already taken"
            } else {
                "record already exists"
            };
            return RepositoryError::Conflict(field.to_string());
        }
    }
    RepositoryError::Database(e)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn sample_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            name: "Ana Souza".to_string(),
            email: Email::parse(email).unwrap(),
            password_hash: "$argon2id$fake$hash".to_string(),
            role: Role::Cliente,
            whatsapp: "31900001111".to_string(),
            address: "Rua das Flores, 10".to_string(),
            postal_code: "30130000".to_string(),
            district: "Centro".to_string(),
            city: "Belo Horizonte".to_string(),
            cpf_cnpj: CpfCnpj::parse("12345678901").unwrap(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_then_list_roundtrip() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);

        let created = repo.create(&sample_user("ana", "ana@example.com")).await.unwrap();
        assert_eq!(created.username, "ana");
        assert_eq!(created.role, Role::Cliente);

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].email.as_str(), "ana@example.com");
        assert!(!all[0].created_at.to_rfc3339().is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict_and_store_unchanged() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);

        repo.create(&sample_user("ana", "ana@example.com")).await.unwrap();
        let err = repo
            .create(&sample_user("outra", "ana@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(ref msg) if msg.contains("email")));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_username_is_conflict() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);

        repo.create(&sample_user("ana", "ana@example.com")).await.unwrap();
        let err = repo
            .create(&sample_user("ana", "ana2@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(ref msg) if msg.contains("username")));
    }

    #[tokio::test]
    async fn get_by_username_and_email() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);

        repo.create(&sample_user("ana", "ana@example.com")).await.unwrap();

        let by_name = repo.get_by_username("ana").await.unwrap();
        assert!(by_name.is_some());

        let by_email = repo
            .get_by_email(&Email::parse("ana@example.com").unwrap())
            .await
            .unwrap();
        assert!(by_email.is_some());

        assert!(repo.get_by_username("bruno").await.unwrap().is_none());
    }
}
