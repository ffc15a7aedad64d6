//! Microsoft Graph workbook API client.
//!
//! Low-level HTTP client for the Graph endpoints the adapter needs: drive
//! search and file creation, worksheet enumeration/fetch/creation, range
//! reads and writes, used-range queries, and range deletion with shift.
//!
//! Worksheet names appear inside URL paths and inside `range(address='..')`
//! function segments; both are percent-encoded here so month names and
//! user-created sheets with spaces address correctly.

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use tusheet_core::CellValue;

use crate::error::{ProviderError, ProviderResult};

use super::config::ExcelConfig;

/// Microsoft Graph workbook client.
#[derive(Debug)]
pub struct ExcelClient {
    http_client: reqwest::Client,
    config: ExcelConfig,
}

impl ExcelClient {
    /// Creates a new client from the adapter configuration.
    pub fn new(config: ExcelConfig) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn workbook_url(&self, item_id: &str, suffix: &str) -> String {
        format!(
            "{}/me/drive/items/{}/workbook{}",
            self.config.graph_base_url, item_id, suffix
        )
    }

    fn worksheet_url(&self, item_id: &str, worksheet: &str, suffix: &str) -> String {
        self.workbook_url(
            item_id,
            &format!("/worksheets/{}{}", urlencoding::encode(worksheet), suffix),
        )
    }

    /// Searches the drive root for `.xlsx` files.
    pub async fn search_xlsx(&self) -> ProviderResult<Vec<DriveItem>> {
        let url = format!(
            "{}/me/drive/root/search(q='*.xlsx')",
            self.config.graph_base_url
        );

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(map_transport_error)?;

        let body = read_success_body(response).await?;
        let list: DriveItemListResponse = parse_body(&body)?;

        debug!("drive search returned {} items", list.value.len());
        Ok(list.value)
    }

    /// Creates an empty workbook file at the drive root.
    ///
    /// Graph renames on conflict rather than failing, so the returned item
    /// name is authoritative.
    pub async fn create_workbook(&self, file_name: &str) -> ProviderResult<DriveItem> {
        let url = format!("{}/me/drive/root/children", self.config.graph_base_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.access_token)
            .json(&json!({
                "name": file_name,
                "file": {},
                "@microsoft.graph.conflictBehavior": "rename",
            }))
            .send()
            .await
            .map_err(map_transport_error)?;

        let body = read_success_body(response).await?;
        parse_body(&body)
    }

    /// Lists all worksheets of a workbook.
    pub async fn list_worksheets(&self, item_id: &str) -> ProviderResult<Vec<Worksheet>> {
        let url = self.workbook_url(item_id, "/worksheets");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(map_transport_error)?;

        let body = read_success_body(response).await?;
        let list: WorksheetListResponse = parse_body(&body)?;
        Ok(list.value)
    }

    /// Fetches one worksheet by name.
    ///
    /// This is the only existence probe Graph offers; the provider treats
    /// any error here as "worksheet does not exist".
    pub async fn get_worksheet(&self, item_id: &str, worksheet: &str) -> ProviderResult<Worksheet> {
        let url = self.worksheet_url(item_id, worksheet, "");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(map_transport_error)?;

        let body = read_success_body(response).await?;
        parse_body(&body)
    }

    /// Creates a worksheet with the given name.
    pub async fn create_worksheet(&self, item_id: &str, worksheet: &str) -> ProviderResult<()> {
        let url = self.workbook_url(item_id, "/worksheets");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.access_token)
            .json(&json!({ "name": worksheet }))
            .send()
            .await
            .map_err(map_transport_error)?;

        read_success_body(response).await?;
        Ok(())
    }

    /// Reads a worksheet's used range.
    ///
    /// A brand-new worksheet has no used range; Graph errors on the call,
    /// which the provider folds into its row-index fallback.
    pub async fn used_range(&self, item_id: &str, worksheet: &str) -> ProviderResult<UsedRange> {
        let url = self.worksheet_url(item_id, worksheet, "/usedRange");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(map_transport_error)?;

        let body = read_success_body(response).await?;
        parse_body(&body)
    }

    /// Reads an explicit range (e.g. `A:A`) from a worksheet.
    pub async fn get_range(
        &self,
        item_id: &str,
        worksheet: &str,
        address: &str,
    ) -> ProviderResult<Vec<Vec<CellValue>>> {
        let url = self.worksheet_url(
            item_id,
            worksheet,
            &format!("/range(address='{}')", urlencoding::encode(address)),
        );

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(map_transport_error)?;

        let body = read_success_body(response).await?;
        let range: RangeData = parse_body(&body)?;
        Ok(range.values)
    }

    /// Overwrites an explicit range with the given rows.
    pub async fn patch_range(
        &self,
        item_id: &str,
        worksheet: &str,
        address: &str,
        values: &[Vec<String>],
    ) -> ProviderResult<()> {
        let url = self.worksheet_url(
            item_id,
            worksheet,
            &format!("/range(address='{}')", urlencoding::encode(address)),
        );

        let response = self
            .http_client
            .patch(&url)
            .bearer_auth(&self.config.access_token)
            .json(&json!({ "values": values }))
            .send()
            .await
            .map_err(map_transport_error)?;

        read_success_body(response).await?;
        Ok(())
    }

    /// Deletes a whole-row range (`{row}:{row}`) and shifts subsequent rows
    /// up - the Graph expression of a row delete.
    pub async fn delete_row(&self, item_id: &str, worksheet: &str, row: u32) -> ProviderResult<()> {
        let address = format!("{}:{}", row, row);
        let url = self.worksheet_url(
            item_id,
            worksheet,
            &format!("/range(address='{}')/delete", urlencoding::encode(&address)),
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.access_token)
            .json(&json!({ "shift": "Up" }))
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
        return Err(ProviderError::authorization("access denied to workbook"));
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ProviderError::not_found("workbook or worksheet not found"));
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
        let message = graph_error_message(&body).unwrap_or(body);
        return Err(ProviderError::server(format!(
            "Graph API error ({}): {}",
            status, message
        )));
    }

    response
        .text()
        .await
        .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))
}

/// Extracts the human-readable message from a Graph error body.
fn graph_error_message(body: &str) -> Option<String> {
    let parsed: GraphErrorResponse = serde_json::from_str(body).ok()?;
    Some(parsed.error.message)
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &str) -> ProviderResult<T> {
    serde_json::from_str(body)
        .map_err(|e| ProviderError::invalid_response(format!("failed to parse response: {}", e)))
}

/// A drive item from search or creation.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveItem {
    /// Item id.
    pub id: String,
    /// File name, including extension.
    pub name: String,
    /// Present only when the item is a file (folders lack it).
    #[serde(default)]
    pub file: Option<FileFacet>,
}

impl DriveItem {
    /// True for `.xlsx` files; drive search also returns folders and
    /// near-matches that must be filtered out.
    pub fn is_xlsx(&self) -> bool {
        self.file.is_some() && self.name.ends_with(".xlsx")
    }

    /// Display name with the `.xlsx` suffix stripped.
    pub fn display_name(&self) -> &str {
        self.name.strip_suffix(".xlsx").unwrap_or(&self.name)
    }
}

/// Marker facet Graph attaches to file items.
#[derive(Debug, Clone, Deserialize)]
pub struct FileFacet {
    /// MIME type, unused but present in every file facet.
    #[serde(default, rename = "mimeType")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DriveItemListResponse {
    #[serde(default)]
    value: Vec<DriveItem>,
}

/// One worksheet of a workbook.
#[derive(Debug, Clone, Deserialize)]
pub struct Worksheet {
    /// Worksheet id.
    #[serde(default)]
    pub id: String,
    /// Worksheet name.
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct WorksheetListResponse {
    #[serde(default)]
    value: Vec<Worksheet>,
}

/// A worksheet's used range.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsedRange {
    /// Number of rows in the used range (header included).
    #[serde(default)]
    pub row_count: u32,
    /// Cell values, rows of columns.
    #[serde(default)]
    pub values: Vec<Vec<CellValue>>,
}

#[derive(Debug, Deserialize)]
struct RangeData {
    #[serde(default)]
    values: Vec<Vec<CellValue>>,
}

#[derive(Debug, Deserialize)]
struct GraphErrorResponse {
    error: GraphError,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_drive_search() {
        let json = r#"{
            "value": [
                { "id": "item1", "name": "Tasks.xlsx", "file": { "mimeType": "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" } },
                { "id": "item2", "name": "xlsx-exports" },
                { "id": "item3", "name": "Notes.docx", "file": {} }
            ]
        }"#;

        let list: DriveItemListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(list.value.len(), 3);
        assert!(list.value[0].is_xlsx());
        // A folder whose name merely mentions xlsx.
        assert!(!list.value[1].is_xlsx());
        // A file with the wrong extension.
        assert!(!list.value[2].is_xlsx());
        assert_eq!(list.value[0].display_name(), "Tasks");
    }

    #[test]
    fn parse_worksheet_list() {
        let json = r#"{
            "value": [
                { "id": "{0000-01}", "name": "Sheet1" },
                { "id": "{0000-02}", "name": "2024-01" }
            ]
        }"#;

        let list: WorksheetListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(list.value.len(), 2);
        assert_eq!(list.value[1].name, "2024-01");
    }

    #[test]
    fn parse_used_range_with_serials() {
        let json = r#"{
            "address": "2024-01!A1:E2",
            "rowCount": 2,
            "values": [
                ["UID", "Task Number", "Description", "Date", "Time"],
                ["abc123", "T-001", "Write spec", 45306, 2.5]
            ]
        }"#;

        let range: UsedRange = serde_json::from_str(json).unwrap();
        assert_eq!(range.row_count, 2);
        assert_eq!(range.values[1][3], CellValue::Number(45306.0));
    }

    #[test]
    fn parse_used_range_without_values() {
        let range: UsedRange = serde_json::from_str(r#"{ "rowCount": 1 }"#).unwrap();
        assert_eq!(range.row_count, 1);
        assert!(range.values.is_empty());
    }

    #[test]
    fn graph_error_body_message() {
        let body = r#"{ "error": { "code": "itemNotFound", "message": "The resource could not be found." } }"#;
        assert_eq!(
            graph_error_message(body).as_deref(),
            Some("The resource could not be found.")
        );
        assert!(graph_error_message("not json").is_none());
    }
}
