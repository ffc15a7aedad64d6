//! Excel Online provider implementation.
//!
//! Implements the [`SpreadsheetProvider`] contract over a
//! worksheet-per-month workbook model. Two Graph quirks shape this adapter:
//! worksheet existence has no list-contains check, so provisioning attempts
//! a direct fetch and treats failure as absence; and there is no native
//! append call, so every write first reads the used-range row count and
//! then addresses an explicit `A{n}:E{n}` range. The read-then-write pair
//! is the widest concurrency window in the system - two concurrent adds can
//! compute the same target row.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use tusheet_core::{
    HEADER_ROW, SpreadsheetInfo, Task, is_month_partition, identifier_cell_value,
    parse_identifier,
};

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{
    AddTaskOutcome, AddTaskRequest, BatchAppendRequest, BoxFuture, CreateSpreadsheetRequest,
    DeleteTaskRequest, IdentifierCheck, SpreadsheetProvider, UpdateTaskRequest,
    resolve_sheet_title, resolve_task_uid,
};
use crate::rows::{data_range_address, find_uid_row, next_data_row};

use super::client::ExcelClient;
use super::config::ExcelConfig;

/// Provider tag for this backend.
pub const PROVIDER_NAME: &str = "excel-online";

/// Name of the default worksheet in a freshly created workbook.
const DEFAULT_WORKSHEET: &str = "Sheet1";

static GOOGLE_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("invalid google id regex"));

/// Heuristic for an id that belongs to Google Sheets rather than Graph:
/// long, purely alphanumeric/underscore, with none of the hyphens or `!`
/// that Graph item ids carry. Issuing Graph calls with such an id produces
/// nonsensical errors, so the adapter fails fast instead.
pub(crate) fn looks_like_google_sheets_id(id: &str) -> bool {
    id.len() > 30 && !id.contains('!') && !id.contains('-') && GOOGLE_ID_REGEX.is_match(id)
}

/// Excel Online provider.
pub struct ExcelProvider {
    client: ExcelClient,
}

impl ExcelProvider {
    /// Creates a new provider from the adapter configuration.
    pub fn new(config: ExcelConfig) -> ProviderResult<Self> {
        config
            .validate()
            .map_err(|e| ProviderError::configuration(e).with_provider(PROVIDER_NAME))?;
        let client = ExcelClient::new(config)?;
        Ok(Self { client })
    }

    /// Ensures the month worksheet exists, provisioning it with the header
    /// row when missing.
    ///
    /// Fail-then-create: a direct fetch of the worksheet is the only
    /// reliable existence test Graph offers, so any fetch failure is read
    /// as absence and followed by create-plus-header-write.
    async fn ensure_worksheet(&self, sheet_id: &str, month_name: &str) -> ProviderResult<()> {
        if self.client.get_worksheet(sheet_id, month_name).await.is_ok() {
            return Ok(());
        }

        debug!("provisioning month worksheet {}", month_name);
        self.client.create_worksheet(sheet_id, month_name).await?;

        let header: Vec<Vec<String>> =
            vec![HEADER_ROW.iter().map(|h| h.to_string()).collect()];
        self.client
            .patch_range(sheet_id, month_name, "A1:E1", &header)
            .await
            .map_err(|e| {
                ProviderError::provisioning(format!(
                    "worksheet {} created but header write failed: {}",
                    month_name, e
                ))
                .with_source(e)
            })?;

        Ok(())
    }

    /// The next writable 1-based row of a worksheet, from its used range.
    ///
    /// A failing used-range read means the worksheet is brand-new (Graph
    /// errors on sheets with no used range at all); both that and a
    /// header-only sheet resolve to row 2.
    async fn next_row(&self, sheet_id: &str, month_name: &str) -> u32 {
        let row_count = self
            .client
            .used_range(sheet_id, month_name)
            .await
            .ok()
            .map(|range| range.row_count);
        next_data_row(row_count)
    }

    /// Scans column A of a worksheet for a uid; any read failure (including
    /// a missing worksheet) is the not-found condition.
    async fn find_task_row(&self, sheet_id: &str, month_name: &str, uid: &str) -> Option<u32> {
        let column = self.client.get_range(sheet_id, month_name, "A:A").await.ok()?;
        find_uid_row(&column, uid).map(|row| row as u32)
    }

    async fn list_spreadsheets_impl(&self) -> ProviderResult<Vec<SpreadsheetInfo>> {
        let items = self.client.search_xlsx().await?;
        Ok(items
            .into_iter()
            .filter(|item| item.is_xlsx())
            .map(|item| SpreadsheetInfo::new(item.id.clone(), item.display_name()))
            .collect())
    }

    async fn create_spreadsheet_impl(
        &self,
        req: CreateSpreadsheetRequest,
    ) -> ProviderResult<SpreadsheetInfo> {
        let title = resolve_sheet_title(&req.name);
        let created = self
            .client
            .create_workbook(&format!("{}.xlsx", title))
            .await?;

        self.client
            .patch_range(
                &created.id,
                DEFAULT_WORKSHEET,
                "A1",
                &[vec![identifier_cell_value()]],
            )
            .await?;

        // Graph renames on name conflicts; the returned item name is the
        // title actually used.
        let actual_title = created.display_name().to_string();
        Ok(SpreadsheetInfo::new(created.id, actual_title))
    }

    async fn check_identifier_impl(&self, sheet_id: &str) -> ProviderResult<IdentifierCheck> {
        if looks_like_google_sheets_id(sheet_id) {
            return Ok(IdentifierCheck::absent());
        }

        let values = self
            .client
            .get_range(sheet_id, DEFAULT_WORKSHEET, "A1")
            .await?;

        let cell = values
            .first()
            .and_then(|row| row.first())
            .cloned()
            .unwrap_or_default()
            .into_text();

        Ok(match parse_identifier(&cell) {
            Some(version) => IdentifierCheck::matched(version),
            None => IdentifierCheck::absent(),
        })
    }

    async fn add_task_impl(&self, req: AddTaskRequest) -> ProviderResult<AddTaskOutcome> {
        let uid = resolve_task_uid(req.uid);

        self.ensure_worksheet(&req.sheet_id, &req.month_sheet_name)
            .await?;

        let row = self.next_row(&req.sheet_id, &req.month_sheet_name).await;
        let values = vec![vec![
            uid.clone(),
            req.number,
            req.description,
            req.date,
            req.time,
        ]];
        self.client
            .patch_range(
                &req.sheet_id,
                &req.month_sheet_name,
                &data_range_address(row, 1),
                &values,
            )
            .await?;

        Ok(AddTaskOutcome { uid })
    }

    async fn update_task_impl(&self, req: UpdateTaskRequest) -> ProviderResult<()> {
        let row = self
            .find_task_row(&req.sheet_id, &req.month_sheet_name, &req.uid)
            .await
            .ok_or_else(|| ProviderError::task_not_found(&req.uid))?;

        let values = vec![vec![
            req.uid,
            req.number,
            req.description,
            req.date,
            req.time,
        ]];
        self.client
            .patch_range(
                &req.sheet_id,
                &req.month_sheet_name,
                &data_range_address(row, 1),
                &values,
            )
            .await
    }

    async fn delete_task_impl(&self, req: DeleteTaskRequest) -> ProviderResult<()> {
        let row = self
            .find_task_row(&req.sheet_id, &req.month_sheet_name, &req.uid)
            .await
            .ok_or_else(|| ProviderError::task_not_found(&req.uid))?;

        self.client
            .delete_row(&req.sheet_id, &req.month_sheet_name, row)
            .await
    }

    async fn batch_append_impl(&self, req: BatchAppendRequest) -> ProviderResult<()> {
        // Provision even for a zero-row batch so the partition exists with
        // its header row before any later write.
        self.ensure_worksheet(&req.sheet_id, &req.month_sheet_name)
            .await?;

        if req.values.is_empty() {
            return Ok(());
        }

        let start_row = self.next_row(&req.sheet_id, &req.month_sheet_name).await;
        self.client
            .patch_range(
                &req.sheet_id,
                &req.month_sheet_name,
                &data_range_address(start_row, req.values.len() as u32),
                &req.values,
            )
            .await
    }

    async fn get_all_tasks_impl(&self, sheet_id: &str) -> ProviderResult<Vec<Task>> {
        if looks_like_google_sheets_id(sheet_id) {
            return Err(ProviderError::bad_request(
                "invalid Excel file id: this appears to be a Google Sheets id; select an Excel file instead",
            ));
        }

        let worksheets = self.client.list_worksheets(sheet_id).await?;
        let month_sheets: Vec<_> = worksheets
            .into_iter()
            .filter(|ws| is_month_partition(&ws.name))
            .collect();

        let mut tasks = Vec::new();
        for worksheet in &month_sheets {
            let range = match self.client.used_range(sheet_id, &worksheet.name).await {
                Ok(range) => range,
                Err(e) => {
                    warn!("skipping month worksheet {}: {}", worksheet.name, e);
                    continue;
                }
            };

            tasks.extend(range.values.iter().skip(1).map(|row| Task::from_row(row)));
        }

        debug!(
            "collected {} tasks from {} month worksheets",
            tasks.len(),
            month_sheets.len()
        );
        Ok(tasks)
    }
}

impl SpreadsheetProvider for ExcelProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn list_spreadsheets(&self) -> BoxFuture<'_, ProviderResult<Vec<SpreadsheetInfo>>> {
        Box::pin(async move {
            self.list_spreadsheets_impl()
                .await
                .map_err(|e| e.with_provider(PROVIDER_NAME))
        })
    }

    fn create_spreadsheet(
        &self,
        req: CreateSpreadsheetRequest,
    ) -> BoxFuture<'_, ProviderResult<SpreadsheetInfo>> {
        Box::pin(async move {
            self.create_spreadsheet_impl(req)
                .await
                .map_err(|e| e.with_provider(PROVIDER_NAME))
        })
    }

    fn check_identifier(&self, sheet_id: &str) -> BoxFuture<'_, IdentifierCheck> {
        let sheet_id = sheet_id.to_string();
        Box::pin(async move {
            match self.check_identifier_impl(&sheet_id).await {
                Ok(check) => check,
                Err(e) => {
                    warn!("identifier check failed, treating as absent: {}", e);
                    IdentifierCheck::absent()
                }
            }
        })
    }

    fn add_task(&self, req: AddTaskRequest) -> BoxFuture<'_, ProviderResult<AddTaskOutcome>> {
        Box::pin(async move {
            self.add_task_impl(req)
                .await
                .map_err(|e| e.with_provider(PROVIDER_NAME))
        })
    }

    fn update_task(&self, req: UpdateTaskRequest) -> BoxFuture<'_, ProviderResult<()>> {
        Box::pin(async move {
            self.update_task_impl(req)
                .await
                .map_err(|e| e.with_provider(PROVIDER_NAME))
        })
    }

    fn delete_task(&self, req: DeleteTaskRequest) -> BoxFuture<'_, ProviderResult<()>> {
        Box::pin(async move {
            self.delete_task_impl(req)
                .await
                .map_err(|e| e.with_provider(PROVIDER_NAME))
        })
    }

    fn batch_append(&self, req: BatchAppendRequest) -> BoxFuture<'_, ProviderResult<()>> {
        Box::pin(async move {
            self.batch_append_impl(req)
                .await
                .map_err(|e| e.with_provider(PROVIDER_NAME))
        })
    }

    fn get_all_tasks(&self, sheet_id: &str) -> BoxFuture<'_, ProviderResult<Vec<Task>>> {
        let sheet_id = sheet_id.to_string();
        Box::pin(async move {
            self.get_all_tasks_impl(&sheet_id)
                .await
                .map_err(|e| e.with_provider(PROVIDER_NAME))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_id_heuristic() {
        // A typical Google Sheets id: 44 chars, underscores, no hyphens.
        assert!(looks_like_google_sheets_id(
            "1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms"
        ));
        // Graph item ids carry an exclamation mark.
        assert!(!looks_like_google_sheets_id(
            "01BYE5RZ6QN3ZWBTUFOFD3GSPGOHDJD36K!103"
        ));
        // Short ids are never flagged.
        assert!(!looks_like_google_sheets_id("abc123"));
        // Hyphenated ids are never flagged.
        assert!(!looks_like_google_sheets_id(
            "0123456789-0123456789-0123456789-0123456789"
        ));
    }

    #[test]
    fn rejects_empty_token() {
        let err = ExcelProvider::new(ExcelConfig::new(" ")).err().expect("must fail");
        assert_eq!(
            err.code(),
            crate::error::ProviderErrorCode::ConfigurationError
        );
        assert_eq!(err.provider(), Some(PROVIDER_NAME));
    }

    #[test]
    fn provider_name() {
        let provider = ExcelProvider::new(ExcelConfig::new("token")).unwrap();
        assert_eq!(provider.name(), "excel-online");
    }

    #[tokio::test]
    async fn check_identifier_fails_closed_on_unreachable_host() {
        // Port 9 on localhost is not listening; the read error must fold
        // into an absent identifier rather than an error.
        let config = ExcelConfig::new("token")
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(std::time::Duration::from_millis(200));
        let provider = ExcelProvider::new(config).unwrap();

        let check = provider.check_identifier("item-id").await;
        assert_eq!(check, IdentifierCheck::absent());
    }

    #[tokio::test]
    async fn batch_append_provisions_before_empty_short_circuit() {
        // A zero-row batch still has to create the month worksheet, so a
        // failed provisioning attempt must surface instead of a silent Ok.
        let config = ExcelConfig::new("token")
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(std::time::Duration::from_millis(200));
        let provider = ExcelProvider::new(config).unwrap();

        let req = BatchAppendRequest {
            sheet_id: "item-id".to_string(),
            month_sheet_name: "2024-01".to_string(),
            values: Vec::new(),
        };
        let err = provider.batch_append(req).await.err().expect("must fail");
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn get_all_tasks_rejects_google_id() {
        let provider = ExcelProvider::new(ExcelConfig::new("token")).unwrap();
        let err = provider
            .get_all_tasks("1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms")
            .await
            .err()
            .expect("must fail");
        assert_eq!(err.code(), crate::error::ProviderErrorCode::BadRequest);
    }
}
