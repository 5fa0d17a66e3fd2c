//! Access roles.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a stored role name is not recognized.
#[derive(thiserror::Error, Debug, Clone)]
#[error("unknown role: {0}")]
pub struct RoleParseError(pub String);

/// A named access tier controlling which pages a session may reach.
///
/// The three recognized roles are fixed; anything else is denied access
/// entirely (there is no default-permissive fallback).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Back-office staff: every page.
    Admin,
    /// Reseller partner: customer creation on top of the customer pages.
    Parceiro,
    /// End customer: home and the assistant page only.
    #[default]
    Cliente,
}

impl Role {
    /// The canonical lowercase name, as stored in the database and the
    /// legacy credentials file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Parceiro => "parceiro",
            Self::Cliente => "cliente",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "parceiro" => Ok(Self::Parceiro),
            "cliente" => Ok(Self::Cliente),
            other => Err(RoleParseError(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_names() {
        for role in [Role::Admin, Role::Parceiro, Role::Cliente] {
            let parsed: Role = role.as_str().parse().unwrap();
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!("gerente".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn serde_uses_lowercase() {
        let json = serde_json::to_string(&Role::Parceiro).unwrap();
        assert_eq!(json, "\"parceiro\"");

        let role: Role = serde_json::from_str("\"cliente\"").unwrap();
        assert_eq!(role, Role::Cliente);
    }
}
