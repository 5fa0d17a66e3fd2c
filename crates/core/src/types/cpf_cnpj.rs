//! CPF/CNPJ tax id type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`CpfCnpj`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum CpfCnpjError {
    /// The input string is empty.
    #[error("CPF/CNPJ cannot be empty")]
    Empty,
    /// A character other than a digit or accepted punctuation was found.
    #[error("CPF/CNPJ may only contain digits, dots, dashes and slashes")]
    InvalidCharacter,
    /// The digit count is neither 11 (CPF) nor 14 (CNPJ).
    #[error("CPF/CNPJ must have 11 or 14 digits (got {0})")]
    InvalidLength(usize),
}

/// A Brazilian tax id: CPF (11 digits) or CNPJ (14 digits).
///
/// Common punctuation (`123.456.789-00`, `12.345.678/0001-00`) is stripped
/// on parse; the canonical form is digits only. Check digits are not
/// verified - the payments provider is the authority on that.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct CpfCnpj(String);

impl CpfCnpj {
    /// Parse a `CpfCnpj` from a string, stripping formatting punctuation.
    ///
    /// # Errors
    ///
    /// Returns a [`CpfCnpjError`] if the input is empty, contains an
    /// unexpected character, or does not have 11 or 14 digits.
    pub fn parse(s: &str) -> Result<Self, CpfCnpjError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CpfCnpjError::Empty);
        }

        let mut digits = String::with_capacity(14);
        for c in trimmed.chars() {
            if c.is_ascii_digit() {
                digits.push(c);
            } else if !matches!(c, '.' | '-' | '/') {
                return Err(CpfCnpjError::InvalidCharacter);
            }
        }

        if digits.len() != 11 && digits.len() != 14 {
            return Err(CpfCnpjError::InvalidLength(digits.len()));
        }

        Ok(Self(digits))
    }

    /// Returns the canonical digits-only form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `CpfCnpj` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// True when this is a CPF (a natural person, 11 digits).
    #[must_use]
    pub fn is_cpf(&self) -> bool {
        self.0.len() == 11
    }

    /// True when this is a CNPJ (a company, 14 digits).
    #[must_use]
    pub fn is_cnpj(&self) -> bool {
        self.0.len() == 14
    }
}

impl fmt::Display for CpfCnpj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CpfCnpj {
    type Err = CpfCnpjError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for CpfCnpj {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_cpf() {
        let cpf = CpfCnpj::parse("12345678901").unwrap();
        assert!(cpf.is_cpf());
        assert!(!cpf.is_cnpj());
        assert_eq!(cpf.as_str(), "12345678901");
    }

    #[test]
    fn parse_cnpj() {
        let cnpj = CpfCnpj::parse("12345678000190").unwrap();
        assert!(cnpj.is_cnpj());
    }

    #[test]
    fn parse_strips_punctuation() {
        let cpf = CpfCnpj::parse("123.456.789-01").unwrap();
        assert_eq!(cpf.as_str(), "12345678901");

        let cnpj = CpfCnpj::parse("12.345.678/0001-90").unwrap();
        assert_eq!(cnpj.as_str(), "12345678000190");
    }

    #[test]
    fn parse_empty() {
        assert!(matches!(CpfCnpj::parse("  "), Err(CpfCnpjError::Empty)));
    }

    #[test]
    fn parse_rejects_letters() {
        assert!(matches!(
            CpfCnpj::parse("1234567890a"),
            Err(CpfCnpjError::InvalidCharacter)
        ));
    }

    #[test]
    fn parse_rejects_wrong_lengths() {
        assert!(matches!(
            CpfCnpj::parse("123456789"),
            Err(CpfCnpjError::InvalidLength(9))
        ));
        assert!(matches!(
            CpfCnpj::parse("123456789012"),
            Err(CpfCnpjError::InvalidLength(12))
        ));
        assert!(matches!(
            CpfCnpj::parse("123456789012345"),
            Err(CpfCnpjError::InvalidLength(15))
        ));
    }

    #[test]
    fn serde_roundtrip() {
        let cpf = CpfCnpj::parse("12345678901").unwrap();
        let json = serde_json::to_string(&cpf).unwrap();
        assert_eq!(json, "\"12345678901\"");

        let parsed: CpfCnpj = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, cpf);
    }
}
