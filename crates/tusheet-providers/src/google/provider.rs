//! Google Sheets provider implementation.
//!
//! Implements the [`SpreadsheetProvider`] contract over a tab-per-month
//! spreadsheet model. Month-tab existence is a single metadata call with a
//! set-membership check; appends go through the API's native append call,
//! so this backend never computes row indices for writes. Deletion is the
//! one Google-specific indirection: dimension-delete requests address tabs
//! by numeric id, which comes from the same metadata call.

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
use crate::rows::find_uid_row;

use super::client::GoogleSheetsClient;
use super::config::GoogleSheetsConfig;

/// Provider tag for this backend.
pub const PROVIDER_NAME: &str = "google-sheets";

/// Google Sheets provider.
pub struct GoogleSheetsProvider {
    client: GoogleSheetsClient,
}

impl GoogleSheetsProvider {
    /// Creates a new provider from the adapter configuration.
    pub fn new(config: GoogleSheetsConfig) -> ProviderResult<Self> {
        config
            .validate()
            .map_err(|e| ProviderError::configuration(e).with_provider(PROVIDER_NAME))?;
        let client = GoogleSheetsClient::new(config)?;
        Ok(Self { client })
    }

    /// Ensures the month tab exists, provisioning it with the header row
    /// when missing.
    ///
    /// There is no atomicity across the add-sheet and header-write pair; a
    /// failure between them leaves a tab without a header, which is why the
    /// header-write failure is reported as a provisioning error.
    async fn ensure_month_tab(&self, sheet_id: &str, month_name: &str) -> ProviderResult<()> {
        let tabs = self.client.sheet_properties(sheet_id).await?;
        if tabs.iter().any(|t| t.title == month_name) {
            return Ok(());
        }

        debug!("provisioning month tab {}", month_name);
        self.client.add_sheet(sheet_id, month_name).await?;

        let header: Vec<Vec<String>> =
            vec![HEADER_ROW.iter().map(|h| h.to_string()).collect()];
        self.client
            .update_values(sheet_id, &format!("{}!A1:E1", month_name), &header)
            .await
            .map_err(|e| {
                ProviderError::provisioning(format!(
                    "tab {} created but header write failed: {}",
                    month_name, e
                ))
                .with_source(e)
            })?;

        Ok(())
    }

    async fn list_spreadsheets_impl(&self) -> ProviderResult<Vec<SpreadsheetInfo>> {
        let files = self.client.list_files().await?;
        Ok(files
            .into_iter()
            .map(|f| SpreadsheetInfo::new(f.id, f.name))
            .collect())
    }

    async fn create_spreadsheet_impl(
        &self,
        req: CreateSpreadsheetRequest,
    ) -> ProviderResult<SpreadsheetInfo> {
        let title = resolve_sheet_title(&req.name);
        let created = self.client.create_spreadsheet(&title).await?;

        let first_tab = created.first_tab_title().to_string();
        self.client
            .update_values(
                &created.spreadsheet_id,
                &format!("{}!A1", first_tab),
                &[vec![identifier_cell_value()]],
            )
            .await?;

        let actual_title = if created.title().is_empty() {
            title
        } else {
            created.title().to_string()
        };
        Ok(SpreadsheetInfo::new(created.spreadsheet_id, actual_title))
    }

    async fn check_identifier_impl(&self, sheet_id: &str) -> ProviderResult<IdentifierCheck> {
        let tabs = self.client.sheet_properties(sheet_id).await?;
        let first_tab = tabs
            .first()
            .map(|t| t.title.as_str())
            .unwrap_or("Sheet1")
            .to_string();

        let values = self
            .client
            .get_values(sheet_id, &format!("{}!A1", first_tab))
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

        self.ensure_month_tab(&req.sheet_id, &req.month_sheet_name)
            .await?;

        let row = vec![vec![
            uid.clone(),
            req.number,
            req.description,
            req.date,
            req.time,
        ]];
        self.client
            .append_values(
                &req.sheet_id,
                &format!("{}!A:E", req.month_sheet_name),
                &row,
            )
            .await?;

        Ok(AddTaskOutcome { uid })
    }

    async fn update_task_impl(&self, req: UpdateTaskRequest) -> ProviderResult<()> {
        let column = self
            .client
            .get_values(&req.sheet_id, &format!("{}!A:A", req.month_sheet_name))
            .await?;

        let row = find_uid_row(&column, &req.uid)
            .ok_or_else(|| ProviderError::task_not_found(&req.uid))?;

        let values = vec![vec![
            req.uid,
            req.number,
            req.description,
            req.date,
            req.time,
        ]];
        self.client
            .update_values(
                &req.sheet_id,
                &format!("{}!A{}:E{}", req.month_sheet_name, row, row),
                &values,
            )
            .await
    }

    async fn delete_task_impl(&self, req: DeleteTaskRequest) -> ProviderResult<()> {
        let column = self
            .client
            .get_values(&req.sheet_id, &format!("{}!A:A", req.month_sheet_name))
            .await?;

        let row = find_uid_row(&column, &req.uid)
            .ok_or_else(|| ProviderError::task_not_found(&req.uid))?;

        let tabs = self.client.sheet_properties(&req.sheet_id).await?;
        let tab = tabs
            .iter()
            .find(|t| t.title == req.month_sheet_name)
            .ok_or_else(|| {
                ProviderError::not_found(format!(
                    "month tab {} disappeared during delete",
                    req.month_sheet_name
                ))
            })?;

        // Dimension ranges are 0-based half-open; row is 1-based.
        self.client
            .delete_rows(&req.sheet_id, tab.sheet_id, (row - 1) as u32, row as u32)
            .await
    }

    async fn batch_append_impl(&self, req: BatchAppendRequest) -> ProviderResult<()> {
        self.ensure_month_tab(&req.sheet_id, &req.month_sheet_name)
            .await?;

        self.client
            .append_values(
                &req.sheet_id,
                &format!("{}!A:E", req.month_sheet_name),
                &req.values,
            )
            .await
    }

    async fn get_all_tasks_impl(&self, sheet_id: &str) -> ProviderResult<Vec<Task>> {
        let tabs = self.client.sheet_properties(sheet_id).await?;
        let month_names: Vec<String> = tabs
            .iter()
            .map(|t| t.title.clone())
            .filter(|name| is_month_partition(name))
            .collect();

        if month_names.is_empty() {
            return Ok(Vec::new());
        }

        let ranges: Vec<String> = month_names.iter().map(|n| format!("{}!A:E", n)).collect();
        let value_ranges = self.client.batch_get_values(sheet_id, &ranges).await?;

        let tasks: Vec<Task> = value_ranges
            .into_iter()
            .flat_map(|rows| {
                rows.into_iter()
                    .skip(1)
                    .map(|row| Task::from_row(&row))
                    .collect::<Vec<_>>()
            })
            .collect();

        debug!("collected {} tasks from {} month tabs", tasks.len(), month_names.len());
        Ok(tasks)
    }
}

impl SpreadsheetProvider for GoogleSheetsProvider {
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
    fn rejects_empty_token() {
        let config = GoogleSheetsConfig::new("");
        let err = GoogleSheetsProvider::new(config).err().expect("must fail");
        assert_eq!(
            err.code(),
            crate::error::ProviderErrorCode::ConfigurationError
        );
        assert_eq!(err.provider(), Some(PROVIDER_NAME));
    }

    #[test]
    fn provider_name() {
        let provider = GoogleSheetsProvider::new(GoogleSheetsConfig::new("token")).unwrap();
        assert_eq!(provider.name(), "google-sheets");
    }
}
