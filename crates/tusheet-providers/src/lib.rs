//! SpreadsheetProvider trait and implementations.
//!
//! This crate is the persistence adapter layer of the task tracker: one
//! abstract contract for task CRUD against a user's own spreadsheet
//! document, plus two implementations that behave identically from the
//! caller's point of view despite genuinely different backing APIs.
//!
//! - [`SpreadsheetProvider`] - the contract every backend implements
//! - [`GoogleSheetsProvider`] - tab-per-month over Sheets v4 + Drive v3
//! - [`ExcelProvider`] - worksheet-per-month over Microsoft Graph
//! - [`create_provider`] - the single construction seam
//! - [`ProviderError`] - error types, with task-not-found as a distinct
//!   branchable condition
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐
//! │ Sheets v4/Drive │    │ Microsoft Graph  │
//! └────────┬────────┘    └────────┬─────────┘
//!          │                      │
//!          ▼                      ▼
//! ┌─────────────────────┐  ┌───────────────┐
//! │ GoogleSheetsProvider│  │ ExcelProvider │
//! └──────────┬──────────┘  └───────┬───────┘
//!            │  SpreadsheetProvider │
//!            └──────────┬───────────┘
//!                       ▼
//!                 ┌──────────┐
//!                 │   Task   │
//!                 └──────────┘
//! ```
//!
//! Backend quirks stay inside their adapter: Excel's serial date/time
//! encodings are normalized at the read boundary and never leak into the
//! shared [`Task`] model.
//!
//! [`Task`]: tusheet_core::Task

pub mod error;
pub mod excel;
pub mod factory;
pub mod google;
pub mod provider;
pub mod rows;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use excel::{ExcelConfig, ExcelProvider};
pub use factory::{AuthorizedClient, ProviderKind, create_provider, create_provider_with_timeout};
pub use google::{GoogleSheetsConfig, GoogleSheetsProvider};
pub use provider::{
    AddTaskOutcome, AddTaskRequest, BatchAppendRequest, BoxFuture, CreateSpreadsheetRequest,
    DEFAULT_SHEET_TITLE, DeleteTaskRequest, IdentifierCheck, SpreadsheetProvider,
    UpdateTaskRequest,
};
