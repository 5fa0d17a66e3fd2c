//! Error types for the payments provider client.

use thiserror::Error;

/// Errors that can occur when calling the payments API.
#[derive(Debug, Error)]
pub enum AsaasError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned an error body.
    #[error("payments API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// First error description from the response body.
        message: String,
    },

    /// Rate limited by the API.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication failed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Failed to parse a response body.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Error response body: `{"errors": [{"code": ..., "description": ...}]}`.
#[derive(Debug, serde::Deserialize)]
pub struct ErrorsResponse {
    pub errors: Vec<ApiErrorItem>,
}

/// One entry of the `errors` array.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorItem {
    pub code: String,
    pub description: String,
}

impl ErrorsResponse {
    /// The first error description, or a placeholder when the array is empty.
    #[must_use]
    pub fn first_description(&self) -> String {
        self.errors
            .first()
            .map_or_else(|| "unknown error".to_string(), |e| e.description.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_deserializes() {
        let json = r#"{
            "errors": [
                {"code": "invalid_cpfCnpj", "description": "CPF/CNPJ inválido."},
                {"code": "invalid_email", "description": "E-mail inválido."}
            ]
        }"#;

        let response: ErrorsResponse = serde_json::from_str(json).expect("deserialize");
        assert_eq!(response.errors.len(), 2);
        assert_eq!(response.errors[0].code, "invalid_cpfCnpj");
        assert_eq!(response.first_description(), "CPF/CNPJ inválido.");
    }

    #[test]
    fn empty_errors_array_has_placeholder() {
        let response: ErrorsResponse = serde_json::from_str(r#"{"errors": []}"#).expect("deserialize");
        assert_eq!(response.first_description(), "unknown error");
    }

    #[test]
    fn error_display() {
        let err = AsaasError::Api {
            status: 400,
            message: "CPF/CNPJ inválido.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "payments API error (400): CPF/CNPJ inválido."
        );

        let err = AsaasError::RateLimited(30);
        assert_eq!(err.to_string(), "rate limited, retry after 30 seconds");
    }
}
