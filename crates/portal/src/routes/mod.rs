//! HTTP route handlers for the portal.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (database)
//!
//! # Auth
//! GET  /auth/login              - Login page
//! POST /auth/login              - Username/password login
//! POST /auth/logout             - Logout
//! GET  /auth/register           - Registration page
//! POST /auth/register           - Register a new cliente
//!
//! # Pages (role-gated, see crate::pages)
//! GET  /                        - Home
//! GET  /pedido                  - Assistant chat
//! POST /pedido/mensagem         - Send a prompt
//! GET  /clientes                - Customer form + listing
//! POST /clientes                - Create customer (payments API)
//! POST /clientes/{id}/excluir   - Delete customer
//! GET  /dashboard               - Payment aggregates
//! GET  /financeiro              - Cobrança form + listing
//! POST /financeiro              - Create cobrança
//! GET  /links                   - Payment link form + listing
//! POST /links                   - Create payment link
//! GET  /parceiros               - Subaccount form + listing
//! POST /parceiros               - Create subaccount
//! GET  /webhooks                - Webhook form + listing
//! POST /webhooks                - Create webhook (local store)
//! POST /webhooks/{id}/excluir   - Delete webhook
//! ```

pub mod auth;
pub mod clients;
pub mod dashboard;
pub mod financial;
pub mod home;
pub mod order;
pub mod partners;
pub mod payment_links;
pub mod webhooks;

use axum::Router;
use rust_decimal::Decimal;

use crate::state::AppState;

/// Build the portal router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(home::router())
        .merge(order::router())
        .merge(clients::router())
        .merge(dashboard::router())
        .merge(financial::router())
        .merge(payment_links::router())
        .merge(partners::router())
        .merge(webhooks::router())
}

/// Parse a form money field; accepts both `159,90` and `159.90`.
pub(crate) fn parse_decimal(raw: &str) -> Option<Decimal> {
    raw.trim().replace(',', ".").parse().ok()
}

/// Format a money value the Brazilian way.
pub(crate) fn format_brl(value: Decimal) -> String {
    format!("R$ {}", format!("{value:.2}").replace('.', ","))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_decimal_accepts_both_separators() {
        assert_eq!(parse_decimal("159,90"), Some(Decimal::new(15990, 2)));
        assert_eq!(parse_decimal(" 159.90 "), Some(Decimal::new(15990, 2)));
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal(""), None);
    }

    #[test]
    fn format_brl_uses_comma() {
        assert_eq!(format_brl(Decimal::new(15990, 2)), "R$ 159,90");
        assert_eq!(format_brl(Decimal::new(5, 0)), "R$ 5,00");
    }
}
