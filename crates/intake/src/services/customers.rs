//! Customer record service.
//!
//! Orchestrates register/list/update/delete against a [`RecordStore`].
//! Every operation re-reads the whole table, then writes at most one row.
//! There is no locking: two concurrent updates of the same customer race and
//! the last write wins.

use std::sync::Arc;

use rand::{Rng, distr::Alphanumeric};
use serde::Serialize;
use tracing::instrument;

use customer_intake_core::{
    CustomerId, CustomerRecord, CustomerUpdate, NewCustomer, format_cep, format_phone, validation,
};

use crate::error::{AppError, Result};
use crate::store::{Column, RecordStore, RowValues, SheetRow, StoreError};

/// Completion marker stored for a completed customer.
const COMPLETED_MARKER: &str = "S";

/// Completion marker stored for a pending customer.
const PENDING_MARKER: &str = "N";

/// Registration date format (`DD/MM/YYYY`).
const DATE_FORMAT: &str = "%d/%m/%Y";

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registered {
    pub id: CustomerId,
    pub customer_code: String,
}

/// Every stored customer, in sheet order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerList {
    pub customers: Vec<CustomerRecord>,
    pub count: usize,
}

/// Outcome of a successful delete, for confirmation messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deleted {
    pub id: CustomerId,
    pub name: String,
}

/// Customer operations over a record store.
#[derive(Clone)]
pub struct CustomerService {
    store: Arc<dyn RecordStore>,
}

impl CustomerService {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Validate, normalize and append a new customer.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for the first invalid field (nothing is
    /// written) or `AppError::Store` if the backend fails.
    #[instrument(skip(self, form), fields(id = tracing::field::Empty))]
    pub async fn register(&self, form: NewCustomer) -> Result<Registered> {
        if let Err(e) = validation::validate_new_customer(&form) {
            tracing::info!(field = %e.field, "Registration rejected");
            return Err(e.into());
        }

        let rows = self.store.list_rows().await?;
        let id = next_id(&rows)?;
        let customer_code = form
            .customer_code
            .filter(|code| !code.trim().is_empty())
            .unwrap_or_else(generate_customer_code);

        let record = CustomerRecord {
            id,
            customer_code: customer_code.clone(),
            name: form.name,
            email: form.email,
            phone: format_phone(&form.phone),
            address: form.address.unwrap_or_default(),
            city: form.city.unwrap_or_default(),
            state: form.state.unwrap_or_default(),
            postal_code: form
                .postal_code
                .map(|cep| format_cep(&cep))
                .unwrap_or_default(),
            acquisition_source: form.acquisition_source.unwrap_or_default(),
            service_type: form.service_type.unwrap_or_default(),
            completed: false,
            observations: form.observations.unwrap_or_default(),
            registered_at: chrono::Local::now().format(DATE_FORMAT).to_string(),
        };

        self.store.append_row(record_to_values(&record)).await?;
        tracing::Span::current().record("id", tracing::field::display(id));
        tracing::info!(id = %id, customer_code = %customer_code, "Customer registered");

        Ok(Registered { id, customer_code })
    }

    /// Read every customer.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the backend fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<CustomerList> {
        let rows = self.store.list_rows().await?;
        let customers: Vec<CustomerRecord> = rows.iter().map(record_from_row).collect();
        let count = customers.len();
        tracing::debug!(count, "Listed customers");
        Ok(CustomerList { customers, count })
    }

    /// Apply a partial update to one customer.
    ///
    /// Phone and postal code are re-formatted before writing.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for an empty update,
    /// `AppError::Validation` for an invalid field, `AppError::NotFound` if no
    /// row has `id` (nothing is written in these cases), or `AppError::Store`.
    #[instrument(skip(self, update), fields(id = %id))]
    pub async fn update(&self, id: CustomerId, update: CustomerUpdate) -> Result<CustomerRecord> {
        if update.is_empty() {
            return Err(AppError::BadRequest("No fields to update".to_string()));
        }
        validation::validate_update(&update)?;

        let mut row = self.find_row(id).await?;
        apply_update(&mut row, update);
        self.store.save_row(&row).await?;

        tracing::info!("Customer updated");
        Ok(record_from_row(&row))
    }

    /// Delete one customer, returning its stored name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no row has `id`, or `AppError::Store`.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: CustomerId) -> Result<Deleted> {
        let row = self.find_row(id).await?;
        let name = row.get(Column::FullName).unwrap_or_default().to_string();
        self.store.delete_row(&row).await?;

        tracing::info!(name = %name, "Customer deleted");
        Ok(Deleted { id, name })
    }

    async fn find_row(&self, id: CustomerId) -> Result<SheetRow> {
        self.store
            .list_rows()
            .await?
            .into_iter()
            .find(|row| row_id(row) == id)
            .ok_or(AppError::NotFound(id))
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

/// Identifier of a row: its ID cell, or its 1-based position when the cell
/// is missing or not a number.
fn row_id(row: &SheetRow) -> CustomerId {
    row.get(Column::Id)
        .and_then(|cell| cell.parse().ok())
        .unwrap_or_else(|| CustomerId::new(i64::try_from(row.index).unwrap_or(i64::MAX - 1) + 1))
}

/// One past the highest identifier in the table; 1 for an empty table.
///
/// Unlike `count + 1` this never hands out an identifier that is still in
/// use after rows are deleted. Fails once the highest identifier is
/// `i64::MAX`.
fn next_id(rows: &[SheetRow]) -> std::result::Result<CustomerId, StoreError> {
    match rows.iter().map(row_id).max() {
        None => Ok(CustomerId::new(1)),
        Some(max) => max
            .next()
            .ok_or_else(|| StoreError::Parse(format!("no identifier left after {max}"))),
    }
}

fn generate_customer_code() -> String {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(6)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect();
    format!("CLI-{suffix}")
}

const fn completion_marker(completed: bool) -> &'static str {
    if completed {
        COMPLETED_MARKER
    } else {
        PENDING_MARKER
    }
}

fn record_to_values(record: &CustomerRecord) -> RowValues {
    [
        (Column::Id, record.id.to_string()),
        (Column::CustomerCode, record.customer_code.clone()),
        (Column::FullName, record.name.clone()),
        (Column::Email, record.email.clone()),
        (Column::Phone, record.phone.clone()),
        (Column::Address, record.address.clone()),
        (Column::City, record.city.clone()),
        (Column::State, record.state.clone()),
        (Column::PostalCode, record.postal_code.clone()),
        (Column::AcquisitionSource, record.acquisition_source.clone()),
        (Column::ServiceType, record.service_type.clone()),
        (
            Column::Completed,
            completion_marker(record.completed).to_string(),
        ),
        (Column::Observations, record.observations.clone()),
        (Column::RegisteredAt, record.registered_at.clone()),
    ]
    .into_iter()
    .map(|(column, value)| (column.header().to_string(), value))
    .collect()
}

fn record_from_row(row: &SheetRow) -> CustomerRecord {
    let text = |column| row.get(column).unwrap_or_default().to_string();

    CustomerRecord {
        id: row_id(row),
        customer_code: text(Column::CustomerCode),
        name: text(Column::FullName),
        email: text(Column::Email),
        phone: text(Column::Phone),
        address: text(Column::Address),
        city: text(Column::City),
        state: text(Column::State),
        postal_code: text(Column::PostalCode),
        acquisition_source: text(Column::AcquisitionSource),
        service_type: text(Column::ServiceType),
        completed: row.get(Column::Completed) == Some(COMPLETED_MARKER),
        observations: text(Column::Observations),
        registered_at: text(Column::RegisteredAt),
    }
}

fn apply_update(row: &mut SheetRow, update: CustomerUpdate) {
    let CustomerUpdate {
        customer_code,
        name,
        email,
        phone,
        address,
        city,
        state,
        postal_code,
        acquisition_source,
        service_type,
        completed,
        observations,
    } = update;

    let text_fields = [
        (Column::CustomerCode, customer_code),
        (Column::FullName, name),
        (Column::Email, email),
        (Column::Phone, phone.map(|p| format_phone(&p))),
        (Column::Address, address),
        (Column::City, city),
        (Column::State, state),
        (Column::PostalCode, postal_code.map(|c| format_cep(&c))),
        (Column::AcquisitionSource, acquisition_source),
        (Column::ServiceType, service_type),
        (Column::Observations, observations),
    ];
    for (column, value) in text_fields {
        if let Some(value) = value {
            row.set(column, value);
        }
    }

    if let Some(completed) = completed {
        row.set(Column::Completed, completion_marker(completed));
    }
}
