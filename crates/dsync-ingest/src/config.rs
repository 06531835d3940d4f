//! Parser configuration.
//!
//! The workbook assumptions (only the first sheet is read, the first row
//! holds the headers) are spelled out here rather than buried in the parser.

use serde::{Deserialize, Serialize};

/// Which worksheet of a workbook to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetSelector {
    /// The first worksheet in workbook order.
    #[default]
    First,
}

/// Where the header row is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderRow {
    /// The first record (CSV) or first row of the used range (workbook).
    #[default]
    First,
}

/// Options controlling how bytes become a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub sheet: SheetSelector,
    pub header_row: HeaderRow,
    /// Convert CSV numeric and boolean literals into typed cells.
    pub infer_types: bool,
    /// Drop records whose fields are all blank.
    pub skip_blank_rows: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            sheet: SheetSelector::First,
            header_row: HeaderRow::First,
            infer_types: true,
            skip_blank_rows: true,
        }
    }
}

impl ParserConfig {
    /// Keep every CSV cell as text.
    #[must_use]
    pub fn without_inference(mut self) -> Self {
        self.infer_types = false;
        self
    }
}
