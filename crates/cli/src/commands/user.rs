//! User management commands.
//!
//! ```bash
//! fp-cli user create -u carlos -n "Carlos Lima" -e carlos@example.com \
//!     -p 'uma-senha-forte' -c 12345678901 -r parceiro
//! ```
//!
//! The web registration form only creates `cliente` records; partner and
//! admin users are provisioned here.

use flash_pagamentos_core::Role;
use flash_pagamentos_portal::services::auth::{AuthService, Registration};

use super::{CliError, connect};

/// Create a new user with the given role.
pub async fn create(
    username: &str,
    name: &str,
    email: &str,
    password: &str,
    cpf_cnpj: &str,
    role: &str,
) -> Result<(), CliError> {
    let role: Role = role
        .parse()
        .map_err(|_| CliError::InvalidRole(role.to_owned()))?;

    let pool = connect().await?;
    let service = AuthService::new(&pool);

    let submission = Registration {
        username: username.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        role,
        // Contact/address details are filled in by the user later; the
        // placeholders below satisfy the presence validation the web form
        // applies to self-registrations.
        whatsapp: "-".to_string(),
        address: "-".to_string(),
        postal_code: "-".to_string(),
        district: "-".to_string(),
        city: "-".to_string(),
        cpf_cnpj: cpf_cnpj.to_string(),
    };

    let user = service.register(&submission).await?;
    tracing::info!(id = %user.id, username = %user.username, role = %user.role, "User created");

    Ok(())
}
