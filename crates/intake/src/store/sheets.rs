//! Google Sheets record store.
//!
//! Talks to the Sheets v4 REST API with a service account. Every store call
//! signs a fresh JWT, exchanges it for an access token, resolves the target
//! worksheet and then reads or writes; no state is kept between calls.
//!
//! The worksheet's first row is the header row. Data row `index` lives on
//! sheet row `index + 2` in A1 notation.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Column, RecordStore, RowValues, SheetRow, StoreError};
use crate::config::SheetsConfig;

/// Sheets API base URL.
const BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// OAuth token endpoint for service accounts.
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Read/write access to spreadsheets.
const SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const JWT_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each access token, in seconds.
const TOKEN_LIFETIME_SECS: i64 = 3600;

/// JWT claims for the service account token exchange.
#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct AppendResponse {
    updates: AppendUpdates,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    updated_range: String,
}

/// An authenticated view of one worksheet, valid for a single store call.
struct Session {
    token: String,
    sheet_id: i64,
    /// Quoted title, ready for A1 notation.
    range_prefix: String,
}

/// Record store backed by a Google Sheets worksheet.
#[derive(Clone)]
pub struct SheetsStore {
    client: reqwest::Client,
    config: SheetsConfig,
}

impl std::fmt::Debug for SheetsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SheetsStore {
    /// Create a new Sheets store.
    ///
    /// Credentials are not checked until the first call.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: SheetsConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, config })
    }

    fn spreadsheet_url(&self) -> String {
        format!("{BASE_URL}/{}", self.config.spreadsheet_id)
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/values/{}",
            self.spreadsheet_url(),
            urlencoding::encode(range)
        )
    }

    /// Exchange a signed service account JWT for an access token.
    async fn access_token(&self) -> Result<String, StoreError> {
        let key = EncodingKey::from_rsa_pem(self.config.private_key.expose_secret().as_bytes())
            .map_err(|e| StoreError::Auth(format!("invalid private key: {e}")))?;

        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            iss: &self.config.client_email,
            scope: SCOPE,
            aud: TOKEN_URL,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| StoreError::Auth(format!("failed to sign token: {e}")))?;

        let response = self
            .client
            .post(TOKEN_URL)
            .form(&[("grant_type", JWT_GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Auth(format!(
                "token request failed: {} - {message}",
                status.as_u16()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;
        Ok(token.access_token)
    }

    /// Authenticate and resolve the configured worksheet.
    async fn session(&self) -> Result<Session, StoreError> {
        let token = self.access_token().await?;

        let response = self
            .client
            .get(format!(
                "{}?fields={}",
                self.spreadsheet_url(),
                urlencoding::encode("sheets.properties(sheetId,title)")
            ))
            .bearer_auth(&token)
            .send()
            .await?;
        let metadata: SpreadsheetMetadata = parse_json(response).await?;

        let properties = select_sheet(metadata, self.config.sheet_title.as_deref())?;
        tracing::debug!(sheet = %properties.title, "Resolved worksheet");

        Ok(Session {
            token,
            sheet_id: properties.sheet_id,
            range_prefix: quote_sheet_title(&properties.title),
        })
    }

    async fn read_range(&self, session: &Session, range: &str) -> Result<Vec<Vec<Value>>, StoreError> {
        let response = self
            .client
            .get(self.values_url(range))
            .bearer_auth(&session.token)
            .send()
            .await?;
        let value_range: ValueRange = parse_json(response).await?;
        Ok(value_range.values)
    }

    async fn write_row(
        &self,
        session: &Session,
        range: &str,
        cells: Vec<String>,
    ) -> Result<(), StoreError> {
        let body = serde_json::json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": [cells],
        });

        let response = self
            .client
            .put(format!("{}?valueInputOption=RAW", self.values_url(range)))
            .bearer_auth(&session.token)
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Read the header row, writing the default headers into an empty sheet.
    async fn header_row(&self, session: &Session) -> Result<Vec<String>, StoreError> {
        let range = format!("{}!1:1", session.range_prefix);
        let header: Vec<String> = self
            .read_range(session, &range)
            .await?
            .into_iter()
            .next()
            .unwrap_or_default()
            .iter()
            .map(cell_to_string)
            .collect();

        if header.iter().all(String::is_empty) {
            let defaults: Vec<String> = Column::ALL.iter().map(|c| c.header().to_string()).collect();
            tracing::info!("Worksheet has no header row; writing default headers");
            self.write_row(session, &row_range(&session.range_prefix, 1), defaults.clone())
                .await?;
            return Ok(defaults);
        }

        Ok(header)
    }
}

#[async_trait]
impl RecordStore for SheetsStore {
    async fn list_rows(&self) -> Result<Vec<SheetRow>, StoreError> {
        let session = self.session().await?;
        let values = self.read_range(&session, &session.range_prefix).await?;
        let rows = rows_from_values(values);
        tracing::debug!(count = rows.len(), "Read worksheet rows");
        Ok(rows)
    }

    async fn append_row(&self, values: RowValues) -> Result<SheetRow, StoreError> {
        let session = self.session().await?;
        let header = self.header_row(&session).await?;
        warn_unmapped(&header, &values);
        let cells = ordered_cells(&header, &values);

        let response = self
            .client
            .post(format!(
                "{}:append?valueInputOption=RAW&insertDataOption=INSERT_ROWS",
                self.values_url(&session.range_prefix)
            ))
            .bearer_auth(&session.token)
            .json(&serde_json::json!({ "values": [cells] }))
            .send()
            .await?;
        let appended: AppendResponse = parse_json(response).await?;

        let sheet_row = parse_updated_row(&appended.updates.updated_range).ok_or_else(|| {
            StoreError::Parse(format!(
                "unexpected updated range: {}",
                appended.updates.updated_range
            ))
        })?;
        let index = sheet_row.checked_sub(2).ok_or_else(|| {
            StoreError::Parse(format!("row appended inside header: {sheet_row}"))
        })?;

        Ok(SheetRow::new(index, values))
    }

    async fn save_row(&self, row: &SheetRow) -> Result<(), StoreError> {
        let session = self.session().await?;
        let header = self.header_row(&session).await?;
        warn_unmapped(&header, row.cells());
        let cells = ordered_cells(&header, row.cells());
        let range = data_row_range(&session.range_prefix, row.index);
        self.write_row(&session, &range, cells).await
    }

    async fn delete_row(&self, row: &SheetRow) -> Result<(), StoreError> {
        let session = self.session().await?;
        let body = delete_row_request(session.sheet_id, row.index);

        let response = self
            .client
            .post(format!("{}:batchUpdate", self.spreadsheet_url()))
            .bearer_auth(&session.token)
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(StoreError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn parse_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, StoreError> {
    check_status(response)
        .await?
        .json()
        .await
        .map_err(|e| StoreError::Parse(e.to_string()))
}

fn select_sheet(
    metadata: SpreadsheetMetadata,
    title: Option<&str>,
) -> Result<SheetProperties, StoreError> {
    let mut sheets = metadata.sheets.into_iter().map(|s| s.properties);
    match title {
        Some(title) => sheets
            .find(|p| p.title == title)
            .ok_or_else(|| StoreError::Parse(format!("worksheet '{title}' not found"))),
        None => sheets
            .next()
            .ok_or_else(|| StoreError::Parse("spreadsheet has no worksheets".to_string())),
    }
}

/// Quote a worksheet title for A1 notation (`'My Sheet'`).
fn quote_sheet_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// A1 range starting at column A of a 1-based sheet row.
fn row_range(prefix: &str, sheet_row: usize) -> String {
    format!("{prefix}!A{sheet_row}")
}

/// A1 range of data row `index`; row 1 is the header.
fn data_row_range(prefix: &str, index: usize) -> String {
    row_range(prefix, index + 2)
}

/// `batchUpdate` body removing data row `index`.
fn delete_row_request(sheet_id: i64, index: usize) -> Value {
    // Grid indexes are 0-based and include the header row.
    let start = index + 1;
    serde_json::json!({
        "requests": [{
            "deleteDimension": {
                "range": {
                    "sheetId": sheet_id,
                    "dimension": "ROWS",
                    "startIndex": start,
                    "endIndex": start + 1,
                }
            }
        }]
    })
}

/// Extract the first row number from an A1 range such as `'Sheet1'!A5:N5`.
fn parse_updated_row(range: &str) -> Option<usize> {
    let cells = range.rsplit_once('!').map_or(range, |(_, cells)| cells);
    let start = cells.split(':').next()?;
    let digits: String = start
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Turn a header-first grid into data rows keyed by header text.
///
/// Sheets omits trailing empty cells, so short rows simply lack those keys.
fn rows_from_values(values: Vec<Vec<Value>>) -> Vec<SheetRow> {
    let mut grid = values.into_iter();
    let Some(header) = grid.next() else {
        return Vec::new();
    };
    let header: Vec<String> = header.iter().map(cell_to_string).collect();

    grid.enumerate()
        .map(|(index, cells)| {
            let cells = header
                .iter()
                .zip(cells.iter())
                .filter(|(name, _)| !name.is_empty())
                .map(|(name, value)| (name.clone(), cell_to_string(value)))
                .collect();
            SheetRow::new(index, cells)
        })
        .collect()
}

/// Lay out named values in header order; unknown headers get empty cells.
fn ordered_cells(header: &[String], values: &RowValues) -> Vec<String> {
    header
        .iter()
        .map(|name| values.get(name).cloned().unwrap_or_default())
        .collect()
}

/// Keys with no matching header column, in sorted order.
fn unmapped_keys<'a>(header: &[String], values: &'a RowValues) -> Vec<&'a str> {
    let mut keys: Vec<&str> = values
        .keys()
        .filter(|key| !header.contains(*key))
        .map(String::as_str)
        .collect();
    keys.sort_unstable();
    keys
}

fn warn_unmapped(header: &[String], values: &RowValues) {
    let missing = unmapped_keys(header, values);
    if !missing.is_empty() {
        tracing::warn!(
            columns = ?missing,
            "Worksheet header lacks columns; their values are not stored"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_quote_sheet_title() {
        assert_eq!(quote_sheet_title("Clientes"), "'Clientes'");
        assert_eq!(quote_sheet_title("Ana's list"), "'Ana''s list'");
    }

    #[rstest]
    #[case("'Clientes'!A5:N5", Some(5))]
    #[case("Sheet1!A12:N12", Some(12))]
    #[case("'A!B'!AB300:AC300", Some(300))]
    #[case("A7", Some(7))]
    #[case("'Clientes'!A:N", None)]
    fn test_parse_updated_row(#[case] range: &str, #[case] expected: Option<usize>) {
        assert_eq!(parse_updated_row(range), expected);
    }

    #[test]
    fn test_rows_from_values_keys_by_header() {
        let values = vec![
            vec![json!("ID"), json!("Nome"), json!("Concluído")],
            vec![json!("1"), json!("Ana Silva"), json!("S")],
            vec![json!(2), json!("Bruno")],
        ];

        let rows = rows_from_values(values);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(Column::Id), Some("1"));
        assert_eq!(rows[0].get(Column::Completed), Some("S"));
        assert_eq!(rows[1].index, 1);
        assert_eq!(rows[1].get(Column::Id), Some("2"));
        // Trailing empty cells are omitted by the API.
        assert!(rows[1].get(Column::Completed).is_none());
    }

    #[test]
    fn test_rows_from_empty_sheet() {
        assert!(rows_from_values(Vec::new()).is_empty());
        assert!(rows_from_values(vec![vec![json!("ID")]]).is_empty());
    }

    #[test]
    fn test_ordered_cells_follow_header() {
        let header = vec!["Nome".to_string(), "Extra".to_string(), "ID".to_string()];
        let values = RowValues::from([
            ("ID".to_string(), "3".to_string()),
            ("Nome".to_string(), "Carla".to_string()),
            ("Email".to_string(), "carla@x.com".to_string()),
        ]);
        assert_eq!(ordered_cells(&header, &values), vec!["Carla", "", "3"]);
    }

    #[test]
    fn test_unmapped_keys_lists_missing_columns() {
        let header = vec!["ID".to_string(), "Nome".to_string()];
        let values = RowValues::from([
            ("ID".to_string(), "3".to_string()),
            ("Nome".to_string(), "Carla".to_string()),
            ("Concluído".to_string(), "S".to_string()),
            ("Email".to_string(), "carla@x.com".to_string()),
        ]);
        assert_eq!(unmapped_keys(&header, &values), vec!["Concluído", "Email"]);

        let full: Vec<String> = Column::ALL.iter().map(|c| c.header().to_string()).collect();
        assert!(unmapped_keys(&full, &values).is_empty());
    }

    #[rstest]
    #[case(0, "'Clientes'!A2")]
    #[case(1, "'Clientes'!A3")]
    #[case(41, "'Clientes'!A43")]
    fn test_data_row_range_skips_header(#[case] index: usize, #[case] expected: &str) {
        assert_eq!(data_row_range("'Clientes'", index), expected);
    }

    #[test]
    fn test_header_row_range() {
        assert_eq!(row_range("'Clientes'", 1), "'Clientes'!A1");
    }

    #[rstest]
    #[case(0, 1, 2)]
    #[case(9, 10, 11)]
    fn test_delete_request_targets_data_row(
        #[case] index: usize,
        #[case] start: usize,
        #[case] end: usize,
    ) {
        assert_eq!(
            delete_row_request(42, index),
            json!({
                "requests": [{
                    "deleteDimension": {
                        "range": {
                            "sheetId": 42,
                            "dimension": "ROWS",
                            "startIndex": start,
                            "endIndex": end,
                        }
                    }
                }]
            })
        );
    }

    #[test]
    fn test_select_sheet() {
        let metadata = || SpreadsheetMetadata {
            sheets: vec![
                SheetEntry {
                    properties: SheetProperties {
                        sheet_id: 0,
                        title: "Resumo".to_string(),
                    },
                },
                SheetEntry {
                    properties: SheetProperties {
                        sheet_id: 42,
                        title: "Clientes".to_string(),
                    },
                },
            ],
        };

        assert_eq!(select_sheet(metadata(), None).unwrap().sheet_id, 0);
        assert_eq!(
            select_sheet(metadata(), Some("Clientes")).unwrap().sheet_id,
            42
        );
        assert!(select_sheet(metadata(), Some("Outra")).is_err());
        assert!(select_sheet(SpreadsheetMetadata { sheets: vec![] }, None).is_err());
    }

    #[test]
    fn test_metadata_deserializes() {
        let json = r#"{"sheets":[{"properties":{"sheetId":7,"title":"Clientes"}}]}"#;
        let metadata: SpreadsheetMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.sheets[0].properties.sheet_id, 7);
    }

    #[tokio::test]
    async fn test_invalid_private_key_is_auth_error() {
        let store = SheetsStore::new(SheetsConfig {
            spreadsheet_id: "1AbCdEf".to_string(),
            client_email: "intake@project.iam.gserviceaccount.com".to_string(),
            private_key: "not a pem".to_string().into(),
            sheet_title: None,
        })
        .unwrap();

        assert!(matches!(
            store.list_rows().await,
            Err(StoreError::Auth(_))
        ));
    }
}
