//! Core types for customer intake.
//!
//! This module provides the identifier newtype and the customer record
//! shapes exchanged between the service and the presentation layer.

pub mod customer;
pub mod id;

pub use customer::{CustomerRecord, CustomerUpdate, NewCustomer};
pub use id::*;
