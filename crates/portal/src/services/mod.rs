//! Portal services.

pub mod auth;
pub mod knowledge;
pub mod notify;
