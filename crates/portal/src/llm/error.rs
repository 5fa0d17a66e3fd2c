//! Error types for the LLM inference client.

use thiserror::Error;

/// Errors that can occur when calling the LLM API.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned an error response.
    #[error("LLM API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error detail from the response body.
        message: String,
    },

    /// Rate limited by the API.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication failed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Failed to parse a response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Stream error.
    #[error("stream error: {0}")]
    Stream(String),
}

/// API error response body: `{"detail": "..."}`.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = LlmError::Api {
            status: 422,
            message: "Invalid version".to_string(),
        };
        assert_eq!(err.to_string(), "LLM API error (422): Invalid version");
    }

    #[test]
    fn api_error_deserializes() {
        let response: ApiErrorResponse =
            serde_json::from_str(r#"{"detail": "Invalid token."}"#).expect("deserialize");
        assert_eq!(response.detail, "Invalid token.");
    }
}
