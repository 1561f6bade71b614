//! Unified error handling with Sentry integration.
//!
//! [`AppError`] is the single failure type of the customer service. Route
//! handlers return `Result<T, AppError>`; the `IntoResponse` impl turns every
//! failure into the uniform `{ "success": false, "error": ... }` body so the
//! presentation layer can show the message verbatim.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use customer_intake_core::{CustomerId, ValidationError};

use crate::routes::ApiResponse;
use crate::store::StoreError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// A field failed validation; nothing was written.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// No row carries the requested identifier.
    #[error("Customer {0} not found")]
    NotFound(CustomerId),

    /// The record store failed or is not configured.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::Configuration(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Message safe to show to the user.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            // Operators need to see which credential is missing.
            Self::Store(err @ StoreError::Configuration(_)) => err.to_string(),
            Self::Store(_) => {
                "Could not reach the customer spreadsheet. Please try again.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture backend failures to Sentry
        if matches!(self, Self::Store(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ApiResponse::<()>::failure(self.public_message());
        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use customer_intake_core::validation::validate_email;

    use super::*;
    use crate::config::ConfigError;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound(CustomerId::new(7));
        assert_eq!(err.to_string(), "Customer 7 not found");

        let err = AppError::from(validate_email("not-an-email").unwrap_err());
        assert_eq!(err.to_string(), "Invalid email format");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound(CustomerId::new(1))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Store(StoreError::Parse("test".to_string()))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Store(StoreError::Configuration(
                ConfigError::MissingEnvVar("SHEETS_CLIENT_EMAIL".to_string())
            ))),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_store_details_are_hidden() {
        let err = AppError::Store(StoreError::Api {
            status: 403,
            message: "The caller does not have permission".to_string(),
        });
        assert!(!err.public_message().contains("permission"));

        let err = AppError::Store(StoreError::Configuration(ConfigError::MissingEnvVar(
            "SHEETS_PRIVATE_KEY".to_string(),
        )));
        assert!(err.public_message().contains("SHEETS_PRIVATE_KEY"));
    }
}
