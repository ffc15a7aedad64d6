//! SpreadsheetProvider trait definition.
//!
//! This module defines the [`SpreadsheetProvider`] trait, the single
//! abstraction over the two spreadsheet backends (Google Sheets, Excel
//! Online). Requests arrive already validated; the adapters own translation
//! between the canonical [`Task`] shape and each backend's cell ranges.
//!
//! There are no cross-operation ordering guarantees. Each operation is a
//! short sequence of independent remote calls with no transaction around
//! them; two concurrent writers to the same month partition can interleave
//! (the Excel adapter's read-then-write row addressing is the widest such
//! window). Callers re-fetch [`SpreadsheetProvider::get_all_tasks`] after a
//! mutation rather than trusting optimistic local state.

use std::future::Future;
use std::pin::Pin;

use tusheet_core::{SpreadsheetInfo, Task};

use crate::error::ProviderResult;

/// A boxed future for async trait methods.
///
/// Boxing keeps the trait object-safe, which the factory needs to hand out
/// `Box<dyn SpreadsheetProvider>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Request to create a new spreadsheet document.
#[derive(Debug, Clone)]
pub struct CreateSpreadsheetRequest {
    /// Desired title; trimmed, with a default applied when blank.
    pub name: String,
}

/// Request to append one task to a month partition.
#[derive(Debug, Clone)]
pub struct AddTaskRequest {
    /// Target document id.
    pub sheet_id: String,
    /// Month partition name (`YYYY-MM`).
    pub month_sheet_name: String,
    /// Task number.
    pub number: String,
    /// Task description.
    pub description: String,
    /// Task date (`YYYY-MM-DD`).
    pub date: String,
    /// Time spent, decimal hours as text.
    pub time: String,
    /// Caller-supplied uid; generated when absent.
    pub uid: Option<String>,
}

/// Request to overwrite an existing task's row in place.
#[derive(Debug, Clone)]
pub struct UpdateTaskRequest {
    /// Target document id.
    pub sheet_id: String,
    /// Month partition name (`YYYY-MM`).
    pub month_sheet_name: String,
    /// Uid of the task to update.
    pub uid: String,
    /// New task number.
    pub number: String,
    /// New description.
    pub description: String,
    /// New date (`YYYY-MM-DD`).
    pub date: String,
    /// New time value.
    pub time: String,
}

/// Request to remove a task's row and close the gap.
#[derive(Debug, Clone)]
pub struct DeleteTaskRequest {
    /// Target document id.
    pub sheet_id: String,
    /// Month partition name (`YYYY-MM`).
    pub month_sheet_name: String,
    /// Uid of the task to delete.
    pub uid: String,
}

/// Request to append multiple pre-built rows in one operation.
#[derive(Debug, Clone)]
pub struct BatchAppendRequest {
    /// Target document id.
    pub sheet_id: String,
    /// Month partition name (`YYYY-MM`).
    pub month_sheet_name: String,
    /// Rows to append, columns A-E each, order preserved.
    pub values: Vec<Vec<String>>,
}

/// Result of an identifier-tag check.
///
/// The check gates a warning upstream, not a blocking decision, so it is
/// fail-closed by construction: there is no error variant, and any read
/// failure collapses to `has_identifier: false`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdentifierCheck {
    /// Whether cell A1 of the first tab matched the identifier pattern.
    pub has_identifier: bool,
    /// The captured schema version, when matched.
    pub version: Option<String>,
}

impl IdentifierCheck {
    /// A successful match carrying the captured version.
    pub fn matched(version: impl Into<String>) -> Self {
        Self {
            has_identifier: true,
            version: Some(version.into()),
        }
    }

    /// The fail-closed result: no identifier.
    pub fn absent() -> Self {
        Self::default()
    }
}

/// Outcome of an add: the uid actually written (supplied or generated).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddTaskOutcome {
    /// Uid of the newly appended task.
    pub uid: String,
}

/// The single contract both spreadsheet backends implement.
///
/// # Implementation notes
///
/// - A month partition is a worksheet/tab named `YYYY-MM`; row 1 is always
///   the fixed header, rows 2+ are one task each in insertion order.
/// - Partitions are provisioned lazily on first write. The canonical empty
///   partition has a header row and zero data rows.
/// - Row lookup by uid is a linear scan of column A within one partition;
///   there is no secondary index, which is fine for the few hundred rows a
///   month holds.
/// - No operation retries; failures propagate with a human-readable
///   message, except where an operation's contract says otherwise
///   (`check_identifier`, per-partition reads in `get_all_tasks`).
pub trait SpreadsheetProvider: Send + Sync {
    /// Returns the provider tag ("google-sheets" or "excel-online").
    fn name(&self) -> &str;

    /// Enumerates candidate task documents, filtering out non-matching file
    /// types and stripping implementation suffixes from display names.
    fn list_spreadsheets(&self) -> BoxFuture<'_, ProviderResult<Vec<SpreadsheetInfo>>>;

    /// Creates a new document titled `name.trim()` (or a default when
    /// blank) and writes the identifier tag to A1 of its first tab.
    /// Returns the created id and the title actually used.
    fn create_spreadsheet(
        &self,
        req: CreateSpreadsheetRequest,
    ) -> BoxFuture<'_, ProviderResult<SpreadsheetInfo>>;

    /// Reads A1 of the first tab and matches it against the identifier
    /// pattern. Any failure, including a malformed or cross-provider id,
    /// yields `has_identifier: false` rather than an error.
    fn check_identifier(&self, sheet_id: &str) -> BoxFuture<'_, IdentifierCheck>;

    /// Ensures the month partition exists (provisioning it with the header
    /// row if not), then appends the task. Generates a uid when the request
    /// carries none.
    fn add_task(&self, req: AddTaskRequest) -> BoxFuture<'_, ProviderResult<AddTaskOutcome>>;

    /// Overwrites the 5 cells of the row whose column-A value equals the
    /// request uid. Fails with [`ProviderErrorCode::TaskNotFound`] when no
    /// row matches, including on an empty partition.
    ///
    /// [`ProviderErrorCode::TaskNotFound`]: crate::error::ProviderErrorCode::TaskNotFound
    fn update_task(&self, req: UpdateTaskRequest) -> BoxFuture<'_, ProviderResult<()>>;

    /// Removes the row whose column-A value equals the request uid and
    /// shifts subsequent rows up. Same not-found semantics as
    /// [`update_task`](Self::update_task).
    fn delete_task(&self, req: DeleteTaskRequest) -> BoxFuture<'_, ProviderResult<()>>;

    /// Ensures the partition exists, then appends all rows in one
    /// operation, preserving order and continuing from the current end of
    /// data.
    fn batch_append(&self, req: BatchAppendRequest) -> BoxFuture<'_, ProviderResult<()>>;

    /// Reads every month partition's used range, skips header rows, and
    /// concatenates the mapped tasks in worksheet-enumeration order. A
    /// partition that errors mid-read is skipped; id-format and top-level
    /// enumeration failures propagate.
    fn get_all_tasks(&self, sheet_id: &str) -> BoxFuture<'_, ProviderResult<Vec<Task>>>;
}

/// Default title for documents created with a blank name.
pub const DEFAULT_SHEET_TITLE: &str = "New Task Sheet";

/// Resolves the title a new document gets from a requested name.
pub fn resolve_sheet_title(requested: &str) -> String {
    let trimmed = requested.trim();
    if trimmed.is_empty() {
        DEFAULT_SHEET_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Resolves the uid an add operation writes: the caller-supplied one when
/// present and non-empty, a freshly generated one otherwise.
pub fn resolve_task_uid(supplied: Option<String>) -> String {
    supplied
        .filter(|uid| !uid.is_empty())
        .unwrap_or_else(tusheet_core::generate_uid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_check_constructors() {
        let matched = IdentifierCheck::matched("1.0.0");
        assert!(matched.has_identifier);
        assert_eq!(matched.version.as_deref(), Some("1.0.0"));

        let absent = IdentifierCheck::absent();
        assert!(!absent.has_identifier);
        assert!(absent.version.is_none());
    }

    #[test]
    fn sheet_title_resolution() {
        assert_eq!(resolve_sheet_title("  My Tasks  "), "My Tasks");
        assert_eq!(resolve_sheet_title(""), DEFAULT_SHEET_TITLE);
        assert_eq!(resolve_sheet_title("   "), DEFAULT_SHEET_TITLE);
    }

    #[test]
    fn uid_resolution() {
        assert_eq!(
            resolve_task_uid(Some("caller-uid".to_string())),
            "caller-uid"
        );
        assert!(!resolve_task_uid(None).is_empty());
        // An empty supplied uid is treated as absent.
        assert!(!resolve_task_uid(Some(String::new())).is_empty());
    }
}
