//! Google Sheets backend.
//!
//! Split into a low-level HTTP [`client`] over the Sheets v4 and Drive v3
//! APIs and a [`provider`] implementing the [`SpreadsheetProvider`] contract
//! on top of it.
//!
//! [`SpreadsheetProvider`]: crate::provider::SpreadsheetProvider

pub mod client;
pub mod config;
pub mod provider;

pub use client::GoogleSheetsClient;
pub use config::GoogleSheetsConfig;
pub use provider::GoogleSheetsProvider;
