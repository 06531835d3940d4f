//! Error types for tabular parsing.

use thiserror::Error;

use crate::format::TabularFormat;

/// Errors that can occur while turning bytes into a table.
#[derive(Debug, Error)]
pub enum ParseError {
    // === Format Errors ===
    /// File extension is not one of csv, xlsx, xls.
    #[error("unsupported file format: {extension:?}")]
    UnsupportedFormat { extension: String },

    /// Byte-order mark of an encoding we do not read.
    #[error("unsupported text encoding: {encoding}")]
    UnsupportedEncoding { encoding: &'static str },

    /// Input exceeds the configured size limit.
    #[error("file too large: {size} bytes (max: {max_size} bytes)")]
    FileTooLarge { size: u64, max_size: u64 },

    // === Content Errors ===
    /// Parsed successfully but there is nothing to store.
    #[error("dataset is empty ({headers} headers, {rows} rows)")]
    EmptyDataset { headers: usize, rows: usize },

    /// Malformed CSV input.
    #[error("failed to parse CSV{}: {message}", .line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    CsvParse { line: Option<u64>, message: String },

    /// Workbook container could not be read.
    #[error("failed to read {format} workbook: {message}")]
    Workbook {
        format: TabularFormat,
        message: String,
    },

    /// Workbook contains no worksheet.
    #[error("{format} workbook contains no worksheet")]
    NoWorksheet { format: TabularFormat },
}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        Self::CsvParse {
            line: err.position().map(csv::Position::line),
            message: err.to_string(),
        }
    }
}

/// Result type for parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;
