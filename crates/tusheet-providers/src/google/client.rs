//! Google Sheets / Drive API client.
//!
//! Low-level HTTP client for the Sheets v4 and Drive v3 endpoints the
//! adapter needs: document enumeration and creation, tab metadata, value
//! reads/writes/appends, and structural batch updates.

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use tusheet_core::CellValue;

use crate::error::{ProviderError, ProviderResult};

use super::config::GoogleSheetsConfig;

/// Drive search query for non-trashed Google Sheets documents.
const SPREADSHEET_QUERY: &str =
    "mimeType='application/vnd.google-apps.spreadsheet' and trashed=false";

/// Google Sheets API client.
#[derive(Debug)]
pub struct GoogleSheetsClient {
    http_client: reqwest::Client,
    config: GoogleSheetsConfig,
}

impl GoogleSheetsClient {
    /// Creates a new client from the adapter configuration.
    pub fn new(config: GoogleSheetsConfig) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Lists non-trashed spreadsheet documents via Drive search.
    pub async fn list_files(&self) -> ProviderResult<Vec<DriveFile>> {
        let url = format!("{}/files", self.config.drive_base_url);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.config.access_token)
            .query(&[("q", SPREADSHEET_QUERY), ("fields", "files(id, name)")])
            .send()
            .await
            .map_err(map_transport_error)?;

        let body = read_success_body(response).await?;
        let list: DriveFileListResponse = parse_body(&body)?;

        debug!("drive search returned {} spreadsheets", list.files.len());
        Ok(list.files)
    }

    /// Creates a new spreadsheet with the given title.
    pub async fn create_spreadsheet(&self, title: &str) -> ProviderResult<CreatedSpreadsheet> {
        let url = format!("{}/spreadsheets", self.config.sheets_base_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.access_token)
            .json(&json!({ "properties": { "title": title } }))
            .send()
            .await
            .map_err(map_transport_error)?;

        let body = read_success_body(response).await?;
        let created: CreatedSpreadsheet = parse_body(&body)?;
        Ok(created)
    }

    /// Fetches tab metadata (title + numeric sheet id) for a document.
    ///
    /// One metadata call covers both uses: set-membership existence checks
    /// over tab titles, and the numeric sheet-id lookup deletion needs.
    pub async fn sheet_properties(&self, sheet_id: &str) -> ProviderResult<Vec<SheetProperties>> {
        let url = format!("{}/spreadsheets/{}", self.config.sheets_base_url, sheet_id);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.config.access_token)
            .query(&[("fields", "sheets.properties(sheetId,title)")])
            .send()
            .await
            .map_err(map_transport_error)?;

        let body = read_success_body(response).await?;
        let meta: SpreadsheetMetadataResponse = parse_body(&body)?;

        Ok(meta.sheets.into_iter().map(|s| s.properties).collect())
    }

    /// Reads a value range (e.g. `2024-01!A:A`).
    pub async fn get_values(
        &self,
        sheet_id: &str,
        range: &str,
    ) -> ProviderResult<Vec<Vec<CellValue>>> {
        let url = format!(
            "{}/spreadsheets/{}/values/{}",
            self.config.sheets_base_url,
            sheet_id,
            urlencoding::encode(range)
        );

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(map_transport_error)?;

        let body = read_success_body(response).await?;
        let value_range: ValueRange = parse_body(&body)?;
        Ok(value_range.values)
    }

    /// Reads several value ranges in one call, in request order.
    pub async fn batch_get_values(
        &self,
        sheet_id: &str,
        ranges: &[String],
    ) -> ProviderResult<Vec<Vec<Vec<CellValue>>>> {
        let url = format!(
            "{}/spreadsheets/{}/values:batchGet",
            self.config.sheets_base_url, sheet_id
        );

        let query: Vec<(&str, &str)> = ranges.iter().map(|r| ("ranges", r.as_str())).collect();

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.config.access_token)
            .query(&query)
            .send()
            .await
            .map_err(map_transport_error)?;

        let body = read_success_body(response).await?;
        let batch: BatchGetResponse = parse_body(&body)?;
        Ok(batch.value_ranges.into_iter().map(|vr| vr.values).collect())
    }

    /// Overwrites a range with the given rows, `valueInputOption=RAW`.
    ///
    /// RAW writes keep dates and times as plain strings; Google applies no
    /// serial-number coercion to them.
    pub async fn update_values(
        &self,
        sheet_id: &str,
        range: &str,
        values: &[Vec<String>],
    ) -> ProviderResult<()> {
        let url = format!(
            "{}/spreadsheets/{}/values/{}",
            self.config.sheets_base_url,
            sheet_id,
            urlencoding::encode(range)
        );

        let response = self
            .http_client
            .put(&url)
            .bearer_auth(&self.config.access_token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "values": values }))
            .send()
            .await
            .map_err(map_transport_error)?;

        read_success_body(response).await?;
        Ok(())
    }

    /// Appends rows after the current end of data in a range,
    /// `insertDataOption=INSERT_ROWS`.
    pub async fn append_values(
        &self,
        sheet_id: &str,
        range: &str,
        values: &[Vec<String>],
    ) -> ProviderResult<()> {
        let url = format!(
            "{}/spreadsheets/{}/values/{}:append",
            self.config.sheets_base_url,
            sheet_id,
            urlencoding::encode(range)
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.access_token)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "values": values }))
            .send()
            .await
            .map_err(map_transport_error)?;

        read_success_body(response).await?;
        Ok(())
    }

    /// Adds a new tab with the given title via batchUpdate.
    pub async fn add_sheet(&self, sheet_id: &str, title: &str) -> ProviderResult<()> {
        self.batch_update(
            sheet_id,
            json!([{ "addSheet": { "properties": { "title": title } } }]),
        )
        .await
    }

    /// Deletes rows `[start_index, end_index)` (0-based) from the tab with
    /// the given numeric sheet id via a dimension-delete request. Google
    /// shifts subsequent rows up itself.
    pub async fn delete_rows(
        &self,
        sheet_id: &str,
        tab_numeric_id: i64,
        start_index: u32,
        end_index: u32,
    ) -> ProviderResult<()> {
        self.batch_update(
            sheet_id,
            json!([{
                "deleteDimension": {
                    "range": {
                        "sheetId": tab_numeric_id,
                        "dimension": "ROWS",
                        "startIndex": start_index,
                        "endIndex": end_index,
                    }
                }
            }]),
        )
        .await
    }

    async fn batch_update(
        &self,
        sheet_id: &str,
        requests: serde_json::Value,
    ) -> ProviderResult<()> {
        let url = format!(
            "{}/spreadsheets/{}:batchUpdate",
            self.config.sheets_base_url, sheet_id
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.access_token)
            .json(&json!({ "requests": requests }))
            .send()
            .await
            .map_err(map_transport_error)?;

        read_success_body(response).await?;
        Ok(())
    }
}

/// Maps a reqwest transport error onto a provider error.
fn map_transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::network("request timeout")
    } else if e.is_connect() {
        ProviderError::network(format!("connection failed: {}", e))
    } else {
        ProviderError::network(format!("request failed: {}", e))
    }
}

/// Checks the HTTP status and reads the body of a successful response.
async fn read_success_body(response: reqwest::Response) -> ProviderResult<String> {
    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ProviderError::authentication(
            "access token expired or invalid",
        ));
    }

    if status == reqwest::StatusCode::FORBIDDEN {
        return Err(ProviderError::authorization(
            "access denied to spreadsheet",
        ));
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ProviderError::not_found("spreadsheet or range not found"));
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());
        return Err(ProviderError::rate_limited(format!(
            "rate limit exceeded{}",
            retry_after
                .map(|s| format!(", retry after {} seconds", s))
                .unwrap_or_default()
        )));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::server(format!(
            "API error ({}): {}",
            status, body
        )));
    }

    response
        .text()
        .await
        .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &str) -> ProviderResult<T> {
    serde_json::from_str(body)
        .map_err(|e| ProviderError::invalid_response(format!("failed to parse response: {}", e)))
}

/// A file entry from Drive search.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveFile {
    /// Document id.
    pub id: String,
    /// Document display name.
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct DriveFileListResponse {
    #[serde(default)]
    files: Vec<DriveFile>,
}

/// Response from spreadsheet creation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSpreadsheet {
    /// The new document id.
    pub spreadsheet_id: String,
    /// Document-level properties.
    #[serde(default)]
    pub properties: Option<DocumentProperties>,
    /// The tabs the document was created with.
    #[serde(default)]
    pub sheets: Vec<SheetEntry>,
}

impl CreatedSpreadsheet {
    /// The document title Google actually used.
    pub fn title(&self) -> &str {
        self.properties
            .as_ref()
            .map(|p| p.title.as_str())
            .unwrap_or_default()
    }

    /// The title of the first (default) tab.
    pub fn first_tab_title(&self) -> &str {
        self.sheets
            .first()
            .map(|s| s.properties.title.as_str())
            .unwrap_or("Sheet1")
    }
}

/// Document-level properties.
#[derive(Debug, Deserialize)]
pub struct DocumentProperties {
    /// Document title.
    pub title: String,
}

/// One tab entry in spreadsheet metadata.
#[derive(Debug, Deserialize)]
pub struct SheetEntry {
    /// The tab's properties.
    pub properties: SheetProperties,
}

/// Properties of one tab.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    /// Numeric tab id, needed for dimension-delete requests.
    #[serde(default)]
    pub sheet_id: i64,
    /// Tab title.
    pub title: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMetadataResponse {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

/// A single read range.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<CellValue>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchGetResponse {
    #[serde(default)]
    value_ranges: Vec<ValueRange>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_drive_file_list() {
        let json = r#"{
            "files": [
                { "id": "1aBcD", "name": "My Tasks" },
                { "id": "2eFgH", "name": "Other" }
            ]
        }"#;

        let list: DriveFileListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(list.files.len(), 2);
        assert_eq!(list.files[0].id, "1aBcD");
        assert_eq!(list.files[1].name, "Other");
    }

    #[test]
    fn parse_empty_drive_list() {
        let list: DriveFileListResponse = serde_json::from_str("{}").unwrap();
        assert!(list.files.is_empty());
    }

    #[test]
    fn parse_created_spreadsheet() {
        let json = r#"{
            "spreadsheetId": "abc123",
            "properties": { "title": "My Tasks" },
            "sheets": [
                { "properties": { "sheetId": 0, "title": "Sheet1" } }
            ]
        }"#;

        let created: CreatedSpreadsheet = serde_json::from_str(json).unwrap();
        assert_eq!(created.spreadsheet_id, "abc123");
        assert_eq!(created.title(), "My Tasks");
        assert_eq!(created.first_tab_title(), "Sheet1");
    }

    #[test]
    fn created_spreadsheet_defaults() {
        let created: CreatedSpreadsheet =
            serde_json::from_str(r#"{ "spreadsheetId": "abc123" }"#).unwrap();
        assert_eq!(created.title(), "");
        assert_eq!(created.first_tab_title(), "Sheet1");
    }

    #[test]
    fn parse_sheet_metadata() {
        let json = r#"{
            "sheets": [
                { "properties": { "sheetId": 0, "title": "Sheet1" } },
                { "properties": { "sheetId": 193847562, "title": "2024-01" } }
            ]
        }"#;

        let meta: SpreadsheetMetadataResponse = serde_json::from_str(json).unwrap();
        assert_eq!(meta.sheets.len(), 2);
        assert_eq!(meta.sheets[1].properties.sheet_id, 193847562);
        assert_eq!(meta.sheets[1].properties.title, "2024-01");
    }

    #[test]
    fn parse_value_range_with_mixed_cells() {
        let json = r#"{
            "range": "2024-01!A1:E3",
            "values": [
                ["UID", "Task Number", "Description", "Date", "Time"],
                ["abc123", "T-001", "Write spec", "2024-01-15", "2.5"]
            ]
        }"#;

        let range: ValueRange = serde_json::from_str(json).unwrap();
        assert_eq!(range.values.len(), 2);
        assert_eq!(range.values[1][0], CellValue::Text("abc123".to_string()));
    }

    #[test]
    fn parse_value_range_without_values() {
        // A freshly created tab has no values key at all.
        let range: ValueRange = serde_json::from_str(r#"{ "range": "2024-01!A:A" }"#).unwrap();
        assert!(range.values.is_empty());
    }

    #[test]
    fn parse_batch_get() {
        let json = r#"{
            "valueRanges": [
                { "values": [["UID"], ["abc"]] },
                { "values": [["UID"]] }
            ]
        }"#;

        let batch: BatchGetResponse = serde_json::from_str(json).unwrap();
        assert_eq!(batch.value_ranges.len(), 2);
        assert_eq!(batch.value_ranges[0].values.len(), 2);
    }
}
