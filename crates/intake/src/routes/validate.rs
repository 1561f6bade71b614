//! Inline form validation.
//!
//! The intake form posts whatever fields the user is typing in and renders
//! the returned message under each input. Only submitted fields are checked.

use axum::{Json, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};

use customer_intake_core::{FieldCheck, ValidationError};
use customer_intake_core::validation::{validate_cep, validate_email, validate_name, validate_phone};

use super::{ApiResponse, json_body};
use crate::error::Result;

/// Fields to check.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

/// One check per submitted field.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    /// `true` when every submitted field passed.
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<FieldCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<FieldCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<FieldCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<FieldCheck>,
}

impl From<&ValidateForm> for ValidateResponse {
    fn from(form: &ValidateForm) -> Self {
        let name = check(form.name.as_deref(), validate_name);
        let email = check(form.email.as_deref(), validate_email);
        let phone = check(form.phone.as_deref(), validate_phone);
        let postal_code = check(form.postal_code.as_deref(), validate_cep);
        let valid = [&name, &email, &phone, &postal_code]
            .into_iter()
            .flatten()
            .all(|c| c.valid);

        Self {
            valid,
            name,
            email,
            phone,
            postal_code,
        }
    }
}

fn check(
    value: Option<&str>,
    rule: fn(&str) -> std::result::Result<(), ValidationError>,
) -> Option<FieldCheck> {
    value.map(|v| FieldCheck::from(rule(v)))
}

/// Validate form fields without saving anything.
///
/// POST /api/validate
pub async fn validate(
    payload: std::result::Result<Json<ValidateForm>, JsonRejection>,
) -> Result<Json<ApiResponse<ValidateResponse>>> {
    let form = json_body(payload)?;
    Ok(Json(ApiResponse::ok(ValidateResponse::from(&form))))
}
