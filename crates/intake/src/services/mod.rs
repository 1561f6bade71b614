//! Business services.
//!
//! - `customers` - Customer register/list/update/delete over the record store

pub mod customers;

pub use customers::{CustomerList, CustomerService, Deleted, Registered};
