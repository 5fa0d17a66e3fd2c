//! Unified error handling for the portal.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::asaas::AsaasError;
use crate::db::RepositoryError;
use crate::llm::LlmError;
use crate::pages::AccessDenied;

/// Application-level error type for route handlers.
///
/// Validation, duplicate and authentication failures are normally resolved
/// at the form boundary (redirect with an inline message) and never become
/// an `AppError`; what reaches this type is authorization, external-service
/// and server-side failures.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Payments API operation failed.
    #[error("Payments error: {0}")]
    Asaas(#[from] AsaasError),

    /// LLM API operation failed.
    #[error("Assistant error: {0}")]
    Llm(#[from] LlmError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The session's role may not access the page.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AccessDenied> for AppError {
    fn from(denied: AccessDenied) -> Self {
        Self::Forbidden(denied.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Portal request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Asaas(_) | Self::Llm(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flash_pagamentos_core::Role;
    use crate::pages::Page;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn error_display() {
        let err = AppError::NotFound("webhook 42".to_string());
        assert_eq!(err.to_string(), "Not found: webhook 42");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("x".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("x".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::BadRequest("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn external_service_errors_are_bad_gateway() {
        let err = AppError::Asaas(AsaasError::Api {
            status: 500,
            message: "provider down".to_string(),
        });
        assert_eq!(get_status(err), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn access_denied_maps_to_forbidden() {
        let denied = Page::Dashboard.authorize(Role::Cliente).unwrap_err();
        let err: AppError = denied.into();
        assert_eq!(get_status(err), StatusCode::FORBIDDEN);
    }

    #[test]
    fn internal_details_are_withheld() {
        let err = AppError::Internal("sqlite file is at /var/lib/secret.db".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // The body is the generic message; the path never leaves the server.
    }
}
