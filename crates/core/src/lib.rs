//! Flash Pagamentos Core - Shared types library.
//!
//! This crate provides the validated domain types used across the portal
//! and the CLI:
//!
//! - [`Email`] - structurally validated email address
//! - [`CpfCnpj`] - Brazilian tax id (CPF or CNPJ)
//! - [`Role`] - access tier controlling which pages a session may reach
//! - Type-safe ID newtypes via [`define_id!`]

#![cfg_attr(not(test), forbid(unsafe_code))]

mod types;

pub use types::cpf_cnpj::{CpfCnpj, CpfCnpjError};
pub use types::email::{Email, EmailError};
pub use types::role::{Role, RoleParseError};
pub use types::{UserId, WebhookId};
