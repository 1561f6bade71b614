//! Application state shared across handlers.

use std::sync::Arc;

use crate::services::CustomerService;
use crate::store::RecordStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    customers: CustomerService,
}

impl AppState {
    /// Create a new application state over a record store.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                customers: CustomerService::new(store),
            }),
        }
    }

    /// Get a reference to the customer service.
    #[must_use]
    pub fn customers(&self) -> &CustomerService {
        &self.inner.customers
    }
}
