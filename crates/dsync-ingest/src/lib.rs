//! Tabular data parsing.
//!
//! This crate turns raw file bytes into the normalized
//! [`TableContent`](dsync_model::TableContent) shape shared by every dataset
//! source. It performs no I/O of its own: callers hand in the bytes they
//! read from an upload or fetched from a remote sheet.
//!
//! # Features
//!
//! - **Format hints**: `.csv`, `.xlsx` and `.xls` resolved from file names
//! - **CSV parsing**: first record is the header row, per-cell type inference
//! - **Workbook parsing**: first worksheet only, first row is the header row
//! - **Header normalization**: trimmed, blank headers named, duplicates suffixed
//! - **Guards**: size limit and UTF-16 rejection before any parsing work
//!
//! # Example
//!
//! ```ignore
//! use dsync_ingest::{ParserConfig, TabularFormat, parse_table};
//!
//! let format = TabularFormat::from_file_name("people.csv")?;
//! let table = parse_table(b"name,age\nAda,30\n", format, &ParserConfig::default())?;
//! assert_eq!(table.headers, vec!["name", "age"]);
//! ```

mod config;
mod delimited;
mod error;
mod format;
mod guard;
mod header;
mod workbook;

// === Error Types ===
pub use error::{ParseError, Result};

// === Configuration ===
pub use config::{HeaderRow, ParserConfig, SheetSelector};

// === Formats ===
pub use format::TabularFormat;

// === Parsing ===
pub use delimited::{infer_cell, parse_csv};
pub use guard::{check_size, validate_encoding};
pub use header::normalize_headers;
pub use workbook::parse_workbook;

use dsync_model::TableContent;

/// Parses raw bytes of the given format into normalized table content.
///
/// Fails with [`ParseError::EmptyDataset`] when the result has no headers
/// or no data rows, so callers never persist an empty table.
pub fn parse_table(bytes: &[u8], format: TabularFormat, config: &ParserConfig) -> Result<TableContent> {
    let table = match format {
        TabularFormat::Csv => parse_csv(bytes, config)?,
        TabularFormat::Xlsx | TabularFormat::Xls => parse_workbook(bytes, format, config)?,
    };

    if table.is_empty() {
        return Err(ParseError::EmptyDataset {
            headers: table.headers.len(),
            rows: table.rows.len(),
        });
    }

    tracing::debug!(
        format = %format,
        columns = table.headers.len(),
        rows = table.rows.len(),
        "Parsed tabular data"
    );
    Ok(table)
}
