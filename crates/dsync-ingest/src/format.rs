//! Format hints derived from file names.

use std::fmt;
use std::path::Path;

use dsync_model::DatasetSource;
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, Result};

/// Supported tabular input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabularFormat {
    Csv,
    Xlsx,
    Xls,
}

impl TabularFormat {
    /// Resolves a format from a bare extension (case-insensitive, leading dot allowed).
    pub fn from_extension(extension: &str) -> Result<Self> {
        let ext = extension.trim().trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            "xls" => Ok(Self::Xls),
            _ => Err(ParseError::UnsupportedFormat { extension: ext }),
        }
    }

    /// Resolves a format from an uploaded file name.
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .unwrap_or_default();
        Self::from_extension(extension)
    }

    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
        }
    }

    /// Whether this format is a spreadsheet workbook.
    pub const fn is_workbook(&self) -> bool {
        matches!(self, Self::Xlsx | Self::Xls)
    }

    /// Dataset source recorded for an upload of this format.
    pub const fn upload_source(&self) -> DatasetSource {
        match self {
            Self::Csv => DatasetSource::Csv,
            Self::Xlsx | Self::Xls => DatasetSource::SpreadsheetFile,
        }
    }
}

impl fmt::Display for TabularFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
