//! Customer Intake Core - Shared domain library.
//!
//! This crate provides the pure pieces of the customer intake system:
//! - [`types`] - Customer identifier and record types
//! - [`validation`] - Field validators for the intake form
//! - [`format`] - Phone and postal code canonicalization
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! spreadsheet access, no HTTP clients. Validators and formatters are total:
//! they never panic and always return a value, so the same rules can run
//! inline in the form and again at the service boundary before a write.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod format;
pub mod types;
pub mod validation;

pub use format::{format_cep, format_phone, strip_digits};
pub use types::*;
pub use validation::{Field, FieldCheck, ValidationError, ValidationErrorKind};
