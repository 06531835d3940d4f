//! Unified error type for the dataset services.
//!
//! Every failure carries a stable [`ErrorKind`] so transports can map it
//! to a status code without inspecting messages.

use std::fmt;

use dsync_ingest::ParseError;
use dsync_persistence::PersistenceError;
use dsync_remote::FetchError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable classification of service failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnsupportedFormat,
    EmptyDataset,
    InvalidSheetUrl,
    FetchFailed,
    ParseTimeout,
    NotFound,
    InvalidOperation,
    PersistenceFailure,
    FileTooLarge,
    InvalidData,
}

impl ErrorKind {
    /// Machine-readable code, stable across releases.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat => "unsupported_format",
            Self::EmptyDataset => "empty_dataset",
            Self::InvalidSheetUrl => "invalid_sheet_url",
            Self::FetchFailed => "fetch_failed",
            Self::ParseTimeout => "parse_timeout",
            Self::NotFound => "not_found",
            Self::InvalidOperation => "invalid_operation",
            Self::PersistenceFailure => "persistence_failure",
            Self::FileTooLarge => "file_too_large",
            Self::InvalidData => "invalid_data",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned by the ingestion and sync services.
#[derive(Debug, Error)]
pub enum DatasetError {
    // === Input Errors ===
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("parsing did not finish within {seconds}s")]
    ParseTimeout { seconds: u64 },

    #[error("fetching the sheet did not finish within {seconds}s")]
    FetchTimeout { seconds: u64 },

    // === Lookup Errors ===
    /// No dataset with this id for this owner. Says nothing
    /// about whether another owner has one.
    #[error("dataset not found")]
    NotFound,

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    // === Storage Errors ===
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Temporary upload storage could not be written or read.
    #[error("failed to {operation} staged upload")]
    Staging {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A background parse task panicked or was cancelled.
    #[error("background task failed")]
    Task(#[source] tokio::task::JoinError),
}

impl DatasetError {
    /// Stable classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(e) => match e {
                ParseError::UnsupportedFormat { .. } | ParseError::UnsupportedEncoding { .. } => {
                    ErrorKind::UnsupportedFormat
                }
                ParseError::FileTooLarge { .. } => ErrorKind::FileTooLarge,
                ParseError::EmptyDataset { .. } => ErrorKind::EmptyDataset,
                ParseError::CsvParse { .. }
                | ParseError::Workbook { .. }
                | ParseError::NoWorksheet { .. } => ErrorKind::InvalidData,
            },
            Self::Fetch(FetchError::InvalidSheetUrl { .. }) => ErrorKind::InvalidSheetUrl,
            Self::Fetch(FetchError::TooLarge { .. }) => ErrorKind::FileTooLarge,
            Self::Fetch(_) | Self::FetchTimeout { .. } => ErrorKind::FetchFailed,
            Self::ParseTimeout { .. } => ErrorKind::ParseTimeout,
            Self::NotFound => ErrorKind::NotFound,
            Self::InvalidOperation(_) => ErrorKind::InvalidOperation,
            Self::Persistence(_) | Self::Staging { .. } => ErrorKind::PersistenceFailure,
            Self::Task(_) => ErrorKind::InvalidData,
        }
    }

    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Parse(ParseError::UnsupportedFormat { .. }) => {
                "Only .csv, .xlsx and .xls files can be imported.".to_string()
            }
            Self::Parse(ParseError::UnsupportedEncoding { encoding }) => {
                format!("The file is encoded as {encoding}, which is not supported.")
            }
            Self::Parse(ParseError::FileTooLarge { max_size, .. }) => {
                format!("The file is larger than the {} limit.", format_bytes(*max_size))
            }
            Self::Parse(ParseError::EmptyDataset { .. }) => {
                "The file has no data rows. Nothing was imported.".to_string()
            }
            Self::Parse(_) | Self::Task(_) => "The file could not be read.".to_string(),
            Self::Fetch(e) => e.user_message().to_string(),
            Self::FetchTimeout { .. } => "The spreadsheet took too long to respond.".to_string(),
            Self::ParseTimeout { .. } => "The file took too long to process.".to_string(),
            Self::NotFound => "Dataset not found.".to_string(),
            Self::InvalidOperation(reason) => format!("This action is not available: {reason}."),
            Self::Persistence(e) => e.user_message(),
            Self::Staging { .. } => "The upload could not be stored temporarily.".to_string(),
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Parse(ParseError::UnsupportedFormat { .. }) => {
                Some("Export the data as CSV or Excel and try again.".into())
            }
            Self::Parse(ParseError::UnsupportedEncoding { .. }) => {
                Some("Save the file as UTF-8 CSV and try again.".into())
            }
            Self::Parse(ParseError::FileTooLarge { .. }) => {
                Some("Split the file or remove unused columns.".into())
            }
            Self::Parse(ParseError::EmptyDataset { .. }) => {
                Some("Make sure the first row holds column names and at least one row follows.".into())
            }
            Self::Fetch(FetchError::InvalidSheetUrl { .. }) => {
                Some("Copy the share link from the spreadsheet's Share dialog.".into())
            }
            Self::Fetch(FetchError::HttpStatus { status: 401 | 403 }) => {
                Some("Set link sharing to \"Anyone with the link can view\".".into())
            }
            Self::Fetch(FetchError::TooLarge { .. }) => {
                Some("Remove unused rows or columns from the sheet.".into())
            }
            Self::Fetch(e) if e.is_retryable() => Some("Try again in a moment.".into()),
            Self::FetchTimeout { .. } => Some("Try again in a moment.".into()),
            Self::ParseTimeout { .. } => Some("Try a smaller file.".into()),
            Self::Persistence(e) => e.suggestion(),
            _ => None,
        }
    }
}

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, DatasetError>;

fn format_bytes(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    const KIB: u64 = 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else if bytes >= KIB && bytes % KIB == 0 {
        format!("{} KB", bytes / KIB)
    } else {
        format!("{bytes} bytes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let cases = [
            (
                DatasetError::from(ParseError::UnsupportedFormat {
                    extension: "pdf".to_string(),
                }),
                ErrorKind::UnsupportedFormat,
            ),
            (
                DatasetError::from(ParseError::EmptyDataset {
                    headers: 2,
                    rows: 0,
                }),
                ErrorKind::EmptyDataset,
            ),
            (
                DatasetError::from(ParseError::CsvParse {
                    line: Some(3),
                    message: "bad".to_string(),
                }),
                ErrorKind::InvalidData,
            ),
            (
                DatasetError::from(FetchError::InvalidSheetUrl {
                    url: "x".to_string(),
                }),
                ErrorKind::InvalidSheetUrl,
            ),
            (
                DatasetError::from(FetchError::TooLarge { max_size: 1 }),
                ErrorKind::FileTooLarge,
            ),
            (
                DatasetError::from(FetchError::HttpStatus { status: 500 }),
                ErrorKind::FetchFailed,
            ),
            (
                DatasetError::FetchTimeout { seconds: 30 },
                ErrorKind::FetchFailed,
            ),
            (
                DatasetError::ParseTimeout { seconds: 30 },
                ErrorKind::ParseTimeout,
            ),
            (DatasetError::NotFound, ErrorKind::NotFound),
            (
                DatasetError::from(PersistenceError::EmptyContent {
                    headers: 0,
                    rows: 0,
                }),
                ErrorKind::PersistenceFailure,
            ),
        ];

        for (error, kind) in cases {
            assert_eq!(error.kind(), kind, "{error}");
        }
    }

    #[test]
    fn test_codes_are_snake_case() {
        assert_eq!(ErrorKind::NotFound.code(), "not_found");
        assert_eq!(ErrorKind::FetchFailed.to_string(), "fetch_failed");
        assert_eq!(
            serde_json::to_string(&ErrorKind::InvalidSheetUrl).unwrap(),
            "\"invalid_sheet_url\""
        );
    }

    #[test]
    fn test_user_message_and_suggestion() {
        let err = DatasetError::from(ParseError::FileTooLarge {
            size: 10 * 1024 * 1024,
            max_size: 5 * 1024 * 1024,
        });
        assert!(err.user_message().contains("5 MB"));
        assert!(err.suggestion().is_some());

        let err = DatasetError::from(FetchError::HttpStatus { status: 403 });
        assert!(err.suggestion().unwrap().contains("Anyone with the link"));

        assert_eq!(DatasetError::NotFound.suggestion(), None);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(5 * 1024 * 1024), "5 MB");
        assert_eq!(format_bytes(2048), "2 KB");
        assert_eq!(format_bytes(1500), "1500 bytes");
    }
}
