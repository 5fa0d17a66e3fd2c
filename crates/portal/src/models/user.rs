//! User domain types.
//!
//! These types represent validated domain objects separate from database
//! row types.

use chrono::{DateTime, Utc};

use flash_pagamentos_core::{CpfCnpj, Email, Role, UserId};

/// A registered portal user (domain type).
///
/// The password is stored only as an argon2 hash; the portal never keeps or
/// forwards the cleartext.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name (unique).
    pub username: String,
    /// Display name.
    pub name: String,
    /// User's email address (unique).
    pub email: Email,
    /// Argon2 PHC-format password hash.
    pub password_hash: String,
    /// Access tier.
    pub role: Role,
    /// WhatsApp number with area code.
    pub whatsapp: String,
    /// Street address (endereço).
    pub address: String,
    /// Postal code (CEP).
    pub postal_code: String,
    /// District (bairro).
    pub district: String,
    /// City.
    pub city: String,
    /// CPF or CNPJ.
    pub cpf_cnpj: CpfCnpj,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

/// A validated user record ready for insertion.
///
/// Built by the registration service after field validation and password
/// hashing; the repository persists it verbatim in one transaction.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub email: Email,
    pub password_hash: String,
    pub role: Role,
    pub whatsapp: String,
    pub address: String,
    pub postal_code: String,
    pub district: String,
    pub city: String,
    pub cpf_cnpj: CpfCnpj,
    pub created_at: DateTime<Utc>,
}
