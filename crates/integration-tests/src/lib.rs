//! Integration tests for customer intake.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p customer-intake-integration-tests
//! ```
//!
//! The tests drive the full router in-process against a [`MemoryStore`],
//! so no spreadsheet credentials or network access are needed.
//!
//! [`MemoryStore`]: customer_intake::store::MemoryStore

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use customer_intake::state::AppState;
use customer_intake::store::{Column, MemoryStore, RecordStore, RowValues};

/// A router over an in-memory table, plus a handle on that table.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    /// App over an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    /// App over the given store.
    #[must_use]
    pub fn with_store(store: Arc<MemoryStore>) -> Self {
        let router = customer_intake::app(AppState::new(store.clone()));
        Self { router, store }
    }

    /// Send a request and return status and parsed JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body is not JSON.
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        send(&self.router, method, uri, body).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Router over any record store.
#[must_use]
pub fn app_over(store: Arc<dyn RecordStore>) -> Router {
    customer_intake::app(AppState::new(store))
}

/// Send a request to `router` and return status and parsed JSON body.
///
/// # Panics
///
/// Panics if the request cannot be built or the body is not JSON.
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    match body {
        Some(json) => send_raw(router, method, uri, Body::from(json.to_string())).await,
        None => send_raw(router, method, uri, Body::empty()).await,
    }
}

/// Send `body` as-is under a JSON content type.
///
/// # Panics
///
/// Panics if the request cannot be built or the response body is not JSON.
#[allow(clippy::unwrap_used)]
pub async fn send_raw(
    router: &Router,
    method: Method,
    uri: &str,
    body: Body,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// A stored row with the given id, name and completion marker.
#[must_use]
pub fn row(id: &str, name: &str, completed: &str) -> RowValues {
    RowValues::from([
        (Column::Id.header().to_string(), id.to_string()),
        (Column::FullName.header().to_string(), name.to_string()),
        (Column::Completed.header().to_string(), completed.to_string()),
    ])
}
