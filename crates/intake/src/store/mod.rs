//! Record store adapter for the customer table.
//!
//! The customer table is a flat, header-indexed sheet: the first row names
//! the columns and every following row is one customer. Backends expose the
//! rows through [`RecordStore`] and know nothing about customers beyond the
//! column names in [`Column`].
//!
//! # Backends
//!
//! - [`SheetsStore`] - Google Sheets spreadsheet (production)
//! - [`MemoryStore`] - process-local table (development and tests)
//! - [`UnconfiguredStore`] - stands in when credentials are missing

mod memory;
mod sheets;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{ConfigError, StoreBackend};

pub use memory::MemoryStore;
pub use sheets::SheetsStore;

/// Errors raised by a record store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend is not configured.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Could not obtain an access token.
    #[error("Auth error: {0}")]
    Auth(String),

    /// Failed to parse a response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The row no longer exists at its recorded position.
    #[error("Row {0} no longer exists")]
    RowMissing(usize),
}

/// A column of the customer sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    CustomerCode,
    FullName,
    Email,
    Phone,
    Address,
    City,
    State,
    PostalCode,
    AcquisitionSource,
    ServiceType,
    Completed,
    Observations,
    RegisteredAt,
}

impl Column {
    /// Every column, in sheet order.
    pub const ALL: [Self; 14] = [
        Self::Id,
        Self::CustomerCode,
        Self::FullName,
        Self::Email,
        Self::Phone,
        Self::Address,
        Self::City,
        Self::State,
        Self::PostalCode,
        Self::AcquisitionSource,
        Self::ServiceType,
        Self::Completed,
        Self::Observations,
        Self::RegisteredAt,
    ];

    /// Header text of the column in the sheet.
    #[must_use]
    pub const fn header(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::CustomerCode => "Código",
            Self::FullName => "Nome",
            Self::Email => "Email",
            Self::Phone => "Telefone",
            Self::Address => "Endereço",
            Self::City => "Cidade",
            Self::State => "Estado",
            Self::PostalCode => "CEP",
            Self::AcquisitionSource => "Origem",
            Self::ServiceType => "Tipo de Serviço",
            Self::Completed => "Concluído",
            Self::Observations => "Observações",
            Self::RegisteredAt => "Data de Cadastro",
        }
    }
}

/// Cell values keyed by header text.
pub type RowValues = HashMap<String, String>;

/// One data row of the sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRow {
    /// 0-based position among data rows (the header row is not counted).
    pub index: usize,
    cells: RowValues,
}

impl SheetRow {
    #[must_use]
    pub const fn new(index: usize, cells: RowValues) -> Self {
        Self { index, cells }
    }

    /// Value of a column, `None` when the cell is absent.
    #[must_use]
    pub fn get(&self, column: Column) -> Option<&str> {
        self.cells.get(column.header()).map(String::as_str)
    }

    /// Overwrite a column in this in-memory copy; persist with
    /// [`RecordStore::save_row`].
    pub fn set(&mut self, column: Column, value: impl Into<String>) {
        self.cells.insert(column.header().to_string(), value.into());
    }

    #[must_use]
    pub const fn cells(&self) -> &RowValues {
        &self.cells
    }
}

/// Tabular storage with rows addressed by position.
///
/// Every method is a full round trip to the backend; nothing is cached
/// between calls.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All data rows in sheet order.
    async fn list_rows(&self) -> Result<Vec<SheetRow>, StoreError>;

    /// Append a row after the last data row and return it with its position.
    async fn append_row(&self, values: RowValues) -> Result<SheetRow, StoreError>;

    /// Persist the cells of `row` at `row.index`.
    async fn save_row(&self, row: &SheetRow) -> Result<(), StoreError>;

    /// Remove the row at `row.index`; later rows shift up by one.
    async fn delete_row(&self, row: &SheetRow) -> Result<(), StoreError>;
}

/// Store used when spreadsheet credentials are missing.
///
/// Every call fails with the configuration error captured at startup.
#[derive(Debug, Clone)]
pub struct UnconfiguredStore {
    error: ConfigError,
}

impl UnconfiguredStore {
    #[must_use]
    pub const fn new(error: ConfigError) -> Self {
        Self { error }
    }

    fn fail<T>(&self) -> Result<T, StoreError> {
        Err(StoreError::Configuration(self.error.clone()))
    }
}

#[async_trait]
impl RecordStore for UnconfiguredStore {
    async fn list_rows(&self) -> Result<Vec<SheetRow>, StoreError> {
        self.fail()
    }

    async fn append_row(&self, _values: RowValues) -> Result<SheetRow, StoreError> {
        self.fail()
    }

    async fn save_row(&self, _row: &SheetRow) -> Result<(), StoreError> {
        self.fail()
    }

    async fn delete_row(&self, _row: &SheetRow) -> Result<(), StoreError> {
        self.fail()
    }
}

/// Build the store selected by configuration.
///
/// # Errors
///
/// Returns `StoreError::Http` if the spreadsheet HTTP client fails to build.
pub fn open(backend: &StoreBackend) -> Result<Arc<dyn RecordStore>, StoreError> {
    let store: Arc<dyn RecordStore> = match backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Sheets(config) => Arc::new(SheetsStore::new(config.clone())?),
        StoreBackend::Unconfigured(error) => {
            tracing::warn!(error = %error, "Spreadsheet credentials missing; customer operations will fail");
            Arc::new(UnconfiguredStore::new(error.clone()))
        }
    };
    Ok(store)
}
