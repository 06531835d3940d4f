//! Remote spreadsheet fetching.
//!
//! Resolves a spreadsheet share URL (`.../d/<id>/...`) to its CSV export
//! endpoint and downloads the export bytes. Parsing is left to
//! `dsync-ingest`. The fetcher never retries and never caches.

mod client;
mod error;
mod url;

pub use client::{DEFAULT_MAX_EXPORT_BYTES, FetcherConfig, HttpSheetFetcher, SheetSource};
pub use error::{FetchError, Result};
pub use url::{DEFAULT_EXPORT_URL_TEMPLATE, export_url, extract_sheet_id};
