//! Per-column profile derived from dataset content.
//!
//! The profile is what downstream consumers (report prompts, previews) read
//! instead of walking every row. It is cheap to recompute and therefore safe
//! to cache or not.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::cell::CellValue;
use crate::dataset::Dataset;

/// Number of distinct sample values kept per column.
pub const SAMPLE_VALUES: usize = 5;

/// Dominant value type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Number,
    Boolean,
    Text,
    /// Non-empty values of more than one type.
    Mixed,
    /// No non-empty values at all.
    Empty,
}

impl ColumnKind {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Text => "text",
            Self::Mixed => "mixed",
            Self::Empty => "empty",
        }
    }
}

/// Statistics for a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
    /// Count of non-blank cells.
    pub non_empty: usize,
    /// Count of distinct non-blank values (by display form).
    pub distinct: usize,
    /// Up to [`SAMPLE_VALUES`] distinct values in first-seen order.
    pub sample: Vec<CellValue>,
}

/// Column profiles of a dataset, in header order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    pub row_count: usize,
    pub columns: Vec<ColumnProfile>,
}

impl DatasetSummary {
    /// Profiles every column of `dataset`.
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let columns = dataset
            .headers()
            .iter()
            .map(|header| {
                profile_column(
                    header,
                    dataset
                        .rows()
                        .iter()
                        .map(|row| row.get(header).unwrap_or(&CellValue::Empty)),
                )
            })
            .collect();

        Self {
            row_count: dataset.row_count(),
            columns,
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }
}

fn profile_column<'a>(name: &str, cells: impl Iterator<Item = &'a CellValue>) -> ColumnProfile {
    let mut non_empty = 0usize;
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut sample = Vec::new();
    let (mut numbers, mut bools, mut texts) = (0usize, 0usize, 0usize);

    for cell in cells {
        if cell.is_blank() {
            continue;
        }
        non_empty += 1;
        match cell {
            CellValue::Number(_) => numbers += 1,
            CellValue::Bool(_) => bools += 1,
            CellValue::Text(_) => texts += 1,
            CellValue::Empty => {}
        }
        if seen.insert(cell.to_string()) && sample.len() < SAMPLE_VALUES {
            sample.push(cell.clone());
        }
    }

    let kind = match (numbers, bools, texts) {
        (0, 0, 0) => ColumnKind::Empty,
        (_, 0, 0) => ColumnKind::Number,
        (0, _, 0) => ColumnKind::Boolean,
        (0, 0, _) => ColumnKind::Text,
        _ => ColumnKind::Mixed,
    };

    ColumnProfile {
        name: name.to_string(),
        kind,
        non_empty,
        distinct: seen.len(),
        sample,
    }
}
