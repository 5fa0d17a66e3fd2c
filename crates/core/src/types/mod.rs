//! Core domain types for Flash Pagamentos.

pub mod cpf_cnpj;
pub mod email;
pub mod id;
pub mod role;

crate::define_id!(UserId);
crate::define_id!(WebhookId);
