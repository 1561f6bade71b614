//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health               - Liveness check
//!
//! # Customers
//! GET    /api/customers        - List every customer
//! POST   /api/customers        - Register a customer
//! PATCH  /api/customers/{id}   - Partially update a customer
//! DELETE /api/customers/{id}   - Delete a customer
//!
//! # Form support
//! POST   /api/validate         - Inline field validation
//! ```
//!
//! Every JSON response has the shape `{ success, data?, message?, error? }`.

pub mod customers;
pub mod validate;

use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    routing::{get, patch, post},
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Uniform response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    /// Failed response; `error` is shown to the user verbatim.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error.into()),
        }
    }

    /// Attach a confirmation message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Unwrap a JSON body, turning a rejection into a uniform 400.
fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

/// Create the API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/customers",
            get(customers::list).post(customers::register),
        )
        .route(
            "/api/customers/{id}",
            patch(customers::update).delete(customers::delete),
        )
        .route("/api/validate", post(validate::validate))
}
