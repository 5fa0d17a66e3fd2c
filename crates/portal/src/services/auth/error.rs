//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during registration and login.
///
/// Validation and duplicate errors carry human-readable messages; the route
/// layer surfaces them inline next to the form that caused them.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required registration field was left empty.
    #[error("campo obrigatório ausente: {0}")]
    MissingField(&'static str),

    /// Invalid email shape.
    #[error("e-mail inválido: {0}")]
    InvalidEmail(#[from] flash_pagamentos_core::EmailError),

    /// Invalid CPF/CNPJ.
    #[error("CPF/CNPJ inválido: {0}")]
    InvalidCpfCnpj(#[from] flash_pagamentos_core::CpfCnpjError),

    /// Invalid credentials (wrong password or user not found).
    #[error("usuário ou senha inválidos")]
    InvalidCredentials,

    /// A record with this email already exists.
    #[error("já existe um cadastro com este e-mail")]
    EmailAlreadyRegistered,

    /// A record with this username already exists.
    #[error("este nome de usuário já está em uso")]
    UsernameTaken,

    /// Password too weak.
    #[error("senha fraca: {0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
