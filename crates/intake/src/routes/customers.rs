//! Customer route handlers.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use tracing::instrument;

use customer_intake_core::{CustomerId, CustomerRecord, CustomerUpdate, NewCustomer};

use super::{ApiResponse, json_body};
use crate::error::{AppError, Result};
use crate::services::{CustomerList, Deleted, Registered};
use crate::state::AppState;

fn customer_id(path: std::result::Result<Path<CustomerId>, PathRejection>) -> Result<CustomerId> {
    path.map(|Path(id)| id)
        .map_err(|_| AppError::BadRequest("Customer id must be a number".to_string()))
}

/// List every customer.
///
/// GET /api/customers
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<ApiResponse<CustomerList>>> {
    let list = state.customers().list().await?;
    Ok(Json(ApiResponse::ok(list)))
}

/// Register a customer.
///
/// POST /api/customers
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewCustomer>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Registered>>)> {
    let form = json_body(payload)?;
    let registered = state.customers().register(form).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(registered).with_message("Customer registered")),
    ))
}

/// Partially update a customer.
///
/// PATCH /api/customers/{id}
#[instrument(skip(state, path, payload))]
pub async fn update(
    State(state): State<AppState>,
    path: std::result::Result<Path<CustomerId>, PathRejection>,
    payload: std::result::Result<Json<CustomerUpdate>, JsonRejection>,
) -> Result<Json<ApiResponse<CustomerRecord>>> {
    let id = customer_id(path)?;
    let update = json_body(payload)?;
    let record = state.customers().update(id, update).await?;
    Ok(Json(
        ApiResponse::ok(record).with_message("Customer updated"),
    ))
}

/// Delete a customer.
///
/// DELETE /api/customers/{id}
#[instrument(skip(state, path))]
pub async fn delete(
    State(state): State<AppState>,
    path: std::result::Result<Path<CustomerId>, PathRejection>,
) -> Result<Json<ApiResponse<Deleted>>> {
    let id = customer_id(path)?;
    let deleted = state.customers().delete(id).await?;
    let message = format!("Customer {} deleted", deleted.name);
    Ok(Json(ApiResponse::ok(deleted).with_message(message)))
}
