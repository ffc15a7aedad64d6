//! Excel Online (Microsoft Graph) backend.
//!
//! Split into a low-level HTTP [`client`] over the Graph workbook API and a
//! [`provider`] implementing the [`SpreadsheetProvider`] contract on top of
//! it.
//!
//! [`SpreadsheetProvider`]: crate::provider::SpreadsheetProvider

pub mod client;
pub mod config;
pub mod provider;

pub use client::ExcelClient;
pub use config::ExcelConfig;
pub use provider::ExcelProvider;
