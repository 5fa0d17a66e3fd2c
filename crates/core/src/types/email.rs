//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum EmailError {
    /// The input string is empty.
    #[error("e-mail cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("e-mail must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input does not contain an @ symbol.
    #[error("e-mail must contain an @ symbol")]
    MissingAtSymbol,
    /// The local part (before @) is empty.
    #[error("e-mail local part cannot be empty")]
    EmptyLocalPart,
    /// The domain part (after @) is malformed.
    #[error("e-mail domain must contain a dot")]
    InvalidDomain,
    /// The input contains whitespace.
    #[error("e-mail cannot contain whitespace")]
    ContainsWhitespace,
}

/// An email address.
///
/// Validation is structural only - the shape the registration form checked
/// in production: a non-empty local part, an @ symbol, and a dotted domain.
///
/// ## Constraints
///
/// - Length: 1-254 characters (RFC 5321 limit)
/// - Exactly one @ symbol with a non-empty local part
/// - Domain must contain a dot that is neither its first nor last character
/// - No whitespace anywhere
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] describing the first constraint violated.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if s.chars().any(char::is_whitespace) {
            return Err(EmailError::ContainsWhitespace);
        }

        let at_pos = s.find('@').ok_or(EmailError::MissingAtSymbol)?;

        if at_pos == 0 {
            return Err(EmailError::EmptyLocalPart);
        }

        let domain = &s[at_pos + 1..];
        match domain.find('.') {
            Some(dot) if dot > 0 && dot < domain.len() - 1 => {}
            _ => return Err(EmailError::InvalidDomain),
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_emails() {
        assert!(Email::parse("ana@example.com").is_ok());
        assert!(Email::parse("ana.souza+loja@example.com.br").is_ok());
        assert!(Email::parse("a@b.c").is_ok());
    }

    #[test]
    fn parse_empty() {
        assert!(matches!(Email::parse(""), Err(EmailError::Empty)));
    }

    #[test]
    fn parse_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            Email::parse(&long),
            Err(EmailError::TooLong { .. })
        ));
    }

    #[test]
    fn parse_missing_at() {
        assert!(matches!(
            Email::parse("sem-arroba"),
            Err(EmailError::MissingAtSymbol)
        ));
    }

    #[test]
    fn parse_empty_local_part() {
        assert!(matches!(
            Email::parse("@example.com"),
            Err(EmailError::EmptyLocalPart)
        ));
    }

    #[test]
    fn parse_undotted_domain() {
        assert!(matches!(
            Email::parse("ana@localhost"),
            Err(EmailError::InvalidDomain)
        ));
        assert!(matches!(
            Email::parse("ana@example."),
            Err(EmailError::InvalidDomain)
        ));
        assert!(matches!(
            Email::parse("ana@.com"),
            Err(EmailError::InvalidDomain)
        ));
    }

    #[test]
    fn parse_whitespace() {
        assert!(matches!(
            Email::parse("ana souza@example.com"),
            Err(EmailError::ContainsWhitespace)
        ));
    }

    #[test]
    fn serde_roundtrip() {
        let email = Email::parse("ana@example.com").unwrap();
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"ana@example.com\"");

        let parsed: Email = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, email);
    }

    #[test]
    fn from_str() {
        let email: Email = "ana@example.com".parse().unwrap();
        assert_eq!(email.as_str(), "ana@example.com");
    }
}
