//! Authentication service.
//!
//! Registration (the credential store's `addUser` operation) and
//! username/password login. Passwords are stored as argon2id hashes and the
//! cleartext never leaves this module.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sqlx::SqlitePool;

use flash_pagamentos_core::{CpfCnpj, Email, Role};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::{NewUser, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// An unvalidated registration submission, straight from the form or the
/// seed importer. Every field the legacy credentials file carries.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub whatsapp: String,
    pub address: String,
    pub postal_code: String,
    pub district: String,
    pub city: String,
    pub cpf_cnpj: String,
}

/// Authentication service.
///
/// Handles user registration and login against the credential store.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user.
    ///
    /// Validates that every required field is present, the email shape, the
    /// CPF/CNPJ digit count (11 or 14) and email uniqueness; hashes the
    /// password; stamps `created_at`; persists in one transaction. Nothing
    /// is written when any validation step fails.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField`, `InvalidEmail`, `InvalidCpfCnpj`
    /// or `WeakPassword` for validation failures,
    /// `AuthError::EmailAlreadyRegistered`/`UsernameTaken` for duplicates.
    pub async fn register(&self, submission: &Registration) -> Result<User, AuthError> {
        let validated = validate_registration(submission)?;

        // Duplicate check mirrors the legacy flow; the UNIQUE constraint
        // still backstops a concurrent registration.
        if self.users.get_by_email(&validated.email).await?.is_some() {
            return Err(AuthError::EmailAlreadyRegistered);
        }

        let password_hash = hash_password(&submission.password)?;

        let new_user = NewUser {
            username: submission.username.trim().to_string(),
            name: submission.name.trim().to_string(),
            email: validated.email,
            password_hash,
            role: submission.role,
            whatsapp: submission.whatsapp.trim().to_string(),
            address: submission.address.trim().to_string(),
            postal_code: submission.postal_code.trim().to_string(),
            district: submission.district.trim().to_string(),
            city: submission.city.trim().to_string(),
            cpf_cnpj: validated.cpf_cnpj,
            created_at: Utc::now(),
        };

        let user = self.users.create(&new_user).await.map_err(|e| match e {
            RepositoryError::Conflict(ref msg) if msg.contains("email") => {
                AuthError::EmailAlreadyRegistered
            }
            RepositoryError::Conflict(_) => AuthError::UsernameTaken,
            other => AuthError::Repository(other),
        })?;

        Ok(user)
    }

    /// Login with username and password.
    ///
    /// A missing user and a wrong password are indistinguishable to the
    /// caller. Repeated failures only keep failing - there is no lockout.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the pair does not match.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .users
            .get_by_username(username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        Ok(user)
    }
}

/// The parsed fields that need more than a presence check.
struct ValidatedFields {
    email: Email,
    cpf_cnpj: CpfCnpj,
}

/// Validate a registration submission without touching the store.
fn validate_registration(submission: &Registration) -> Result<ValidatedFields, AuthError> {
    // Presence first, in the order the legacy form listed the fields.
    let required: [(&'static str, &str); 11] = [
        ("username", &submission.username),
        ("name", &submission.name),
        ("email", &submission.email),
        ("password", &submission.password),
        ("role", submission.role.as_str()),
        ("whatsapp", &submission.whatsapp),
        ("endereco", &submission.address),
        ("cep", &submission.postal_code),
        ("bairro", &submission.district),
        ("cidade", &submission.city),
        ("cpf_cnpj", &submission.cpf_cnpj),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(AuthError::MissingField(field));
        }
    }

    let email = Email::parse(submission.email.trim())?;
    let cpf_cnpj = CpfCnpj::parse(&submission.cpf_cnpj)?;

    validate_password(&submission.password)?;

    Ok(ValidatedFields { email, cpf_cnpj })
}

/// Validate password strength.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn ana() -> Registration {
        Registration {
            username: "ana".to_string(),
            name: "Ana Souza".to_string(),
            email: "ana@example.com".to_string(),
            password: "correto-horse-42".to_string(),
            role: Role::Cliente,
            whatsapp: "31900001111".to_string(),
            address: "Rua das Flores, 10".to_string(),
            postal_code: "30130000".to_string(),
            district: "Centro".to_string(),
            city: "Belo Horizonte".to_string(),
            cpf_cnpj: "123.456.789-01".to_string(),
        }
    }

    #[tokio::test]
    async fn register_then_load_contains_exactly_the_record() {
        let pool = test_pool().await;
        let service = AuthService::new(&pool);

        let user = service.register(&ana()).await.unwrap();
        assert_eq!(user.username, "ana");
        assert_eq!(user.cpf_cnpj.as_str(), "12345678901");
        assert!(!user.created_at.to_rfc3339().is_empty());
        // The cleartext never reaches the store.
        assert_ne!(user.password_hash, "correto-horse-42");
        assert!(user.password_hash.starts_with("$argon2"));

        let all = UserRepository::new(&pool).list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].email.as_str(), "ana@example.com");
    }

    #[tokio::test]
    async fn missing_required_field_fails_and_store_is_unchanged() {
        let pool = test_pool().await;
        let service = AuthService::new(&pool);

        for missing in ["username", "name", "email", "whatsapp", "cidade"] {
            let mut submission = ana();
            match missing {
                "username" => submission.username.clear(),
                "name" => submission.name.clear(),
                "email" => submission.email.clear(),
                "whatsapp" => submission.whatsapp.clear(),
                _ => submission.city.clear(),
            }

            let err = service.register(&submission).await.unwrap_err();
            assert!(
                matches!(err, AuthError::MissingField(_)),
                "expected MissingField for {missing}, got {err:?}"
            );
        }

        assert_eq!(UserRepository::new(&pool).count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn bad_tax_id_length_fails_validation() {
        let pool = test_pool().await;
        let service = AuthService::new(&pool);

        for bad in ["123", "123456789012", "123456789012345"] {
            let mut submission = ana();
            submission.cpf_cnpj = bad.to_string();
            let err = service.register(&submission).await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidCpfCnpj(_)), "{bad}: {err:?}");
        }

        assert_eq!(UserRepository::new(&pool).count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn bad_email_shape_fails_validation() {
        let pool = test_pool().await;
        let service = AuthService::new(&pool);

        let mut submission = ana();
        submission.email = "ana-example.com".to_string();
        let err = service.register(&submission).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail(_)));
    }

    #[tokio::test]
    async fn duplicate_email_fails_and_no_second_row_lands() {
        let pool = test_pool().await;
        let service = AuthService::new(&pool);

        service.register(&ana()).await.unwrap();

        let mut second = ana();
        second.username = "ana2".to_string();
        let err = service.register(&second).await.unwrap_err();
        assert!(matches!(err, AuthError::EmailAlreadyRegistered));

        assert_eq!(UserRepository::new(&pool).count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn login_with_wrong_password_fails() {
        let pool = test_pool().await;
        let service = AuthService::new(&pool);

        service.register(&ana()).await.unwrap();

        let err = service.login("ana", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_with_unknown_user_fails_the_same_way() {
        let pool = test_pool().await;
        let service = AuthService::new(&pool);

        let err = service.login("ninguem", "whatever").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_with_correct_credentials_succeeds() {
        let pool = test_pool().await;
        let service = AuthService::new(&pool);

        service.register(&ana()).await.unwrap();

        let user = service.login("ana", "correto-horse-42").await.unwrap();
        assert_eq!(user.role, Role::Cliente);
        assert_eq!(user.name, "Ana Souza");
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let pool = test_pool().await;
        let service = AuthService::new(&pool);

        let mut submission = ana();
        submission.password = "curta".to_string();
        let err = service.register(&submission).await.unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword(_)));
    }
}
