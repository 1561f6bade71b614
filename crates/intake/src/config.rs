//! Intake service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Spreadsheet credentials (required when `INTAKE_STORE=sheets`)
//! - `SHEETS_SPREADSHEET_ID` - ID of the Google spreadsheet holding customers
//! - `SHEETS_CLIENT_EMAIL` - Service account email
//! - `SHEETS_PRIVATE_KEY` - Service account RSA private key (PEM, `\n` escapes allowed)
//!
//! Missing credentials do not stop the server from starting. The store is
//! marked unconfigured and every customer operation fails with a
//! configuration error instead.
//!
//! ## Optional
//! - `INTAKE_HOST` - Bind address (default: 127.0.0.1)
//! - `INTAKE_PORT` - Listen port (default: 3000)
//! - `INTAKE_STORE` - `sheets` (default) or `memory` for local development
//! - `SHEETS_SHEET_TITLE` - Worksheet to use (default: the first one)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Intake service configuration.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Which record store backs the customer table
    pub store: StoreBackend,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Record store selection.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    /// Process-local table, lost on restart.
    Memory,
    /// Google Sheets spreadsheet.
    Sheets(SheetsConfig),
    /// Spreadsheet selected but credentials are missing.
    Unconfigured(ConfigError),
}

/// Google Sheets service account configuration.
///
/// Implements `Debug` manually to redact the private key.
#[derive(Clone)]
pub struct SheetsConfig {
    /// Spreadsheet ID (from the spreadsheet URL)
    pub spreadsheet_id: String,
    /// Service account email, used as the JWT issuer
    pub client_email: String,
    /// Service account RSA private key in PEM format
    pub private_key: SecretString,
    /// Worksheet title; the first worksheet when `None`
    pub sheet_title: Option<String>,
}

impl std::fmt::Debug for SheetsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsConfig")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("client_email", &self.client_email)
            .field("private_key", &"[REDACTED]")
            .field("sheet_title", &self.sheet_title)
            .finish()
    }
}

impl IntakeConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the bind address, port, or store selection is
    /// invalid. Missing spreadsheet credentials are not an error here; see
    /// [`StoreBackend::Unconfigured`].
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("INTAKE_HOST")
            .unwrap_or_else(|| "127.0.0.1".to_string())
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("INTAKE_HOST".to_string(), e.to_string()))?;
        let port = lookup("INTAKE_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("INTAKE_PORT".to_string(), e.to_string()))?;

        let store = match lookup("INTAKE_STORE").as_deref() {
            None | Some("sheets") => match SheetsConfig::from_lookup(&lookup) {
                Ok(sheets) => StoreBackend::Sheets(sheets),
                Err(e) => StoreBackend::Unconfigured(e),
            },
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::InvalidEnvVar(
                    "INTAKE_STORE".to_string(),
                    format!("expected 'sheets' or 'memory', got '{other}'"),
                ));
            }
        };

        Ok(Self {
            host,
            port,
            store,
            sentry_dsn: lookup("SENTRY_DSN"),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: lookup("SENTRY_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1.0),
            sentry_traces_sample_rate: lookup("SENTRY_TRACES_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(0.0),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl SheetsConfig {
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };

        let spreadsheet_id = required("SHEETS_SPREADSHEET_ID")?;
        let client_email = required("SHEETS_CLIENT_EMAIL")?;
        // Keys pasted into .env files usually carry literal "\n" sequences.
        let private_key = required("SHEETS_PRIVATE_KEY")?.replace("\\n", "\n");

        Ok(Self {
            spreadsheet_id,
            client_email,
            private_key: SecretString::from(private_key),
            sheet_title: lookup("SHEETS_SHEET_TITLE").filter(|v| !v.is_empty()),
        })
    }
}
