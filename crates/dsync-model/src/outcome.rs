//! Results reported by ingestion and sync operations.

use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, TableContent};
use crate::ids::DatasetId;

/// Result of creating a dataset from an upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResult {
    pub dataset_id: DatasetId,
    pub row_count: usize,
    pub headers: Vec<String>,
}

impl From<&Dataset> for IngestResult {
    fn from(dataset: &Dataset) -> Self {
        Self {
            dataset_id: dataset.id(),
            row_count: dataset.row_count(),
            headers: dataset.headers().to_vec(),
        }
    }
}

/// Row-count verdict of a sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeType {
    #[serde(rename = "added")]
    Added,
    #[serde(rename = "removed")]
    Removed,
    #[serde(rename = "no change")]
    NoChange,
}

impl ChangeType {
    /// Classifies a signed row delta.
    pub fn from_delta(delta: i64) -> Self {
        match delta {
            d if d > 0 => Self::Added,
            d if d < 0 => Self::Removed,
            _ => Self::NoChange,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::NoChange => "no change",
        }
    }
}

/// Differences between the stored content and freshly fetched content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSummary {
    pub previous_row_count: usize,
    pub current_row_count: usize,
    /// `current - previous`; negative when rows were removed.
    pub rows_changed: i64,
    /// Order-sensitive comparison of header sequences.
    pub headers_changed: bool,
    /// True when any header or cell differs, even at equal row counts.
    pub content_changed: bool,
    pub change_type: ChangeType,
}

impl ChangeSummary {
    /// Compares a stored dataset with content that is about to replace it.
    pub fn between(previous: &Dataset, next: &TableContent) -> Self {
        let previous_row_count = previous.row_count();
        let current_row_count = next.row_count();
        let rows_changed = current_row_count as i64 - previous_row_count as i64;
        Self {
            previous_row_count,
            current_row_count,
            rows_changed,
            headers_changed: previous.headers() != next.headers.as_slice(),
            content_changed: previous.content_hash() != next.content_hash(),
            change_type: ChangeType::from_delta(rows_changed),
        }
    }

    /// Absolute number of rows added or removed.
    pub fn row_delta(&self) -> u64 {
        self.rows_changed.unsigned_abs()
    }
}

/// Result of re-fetching a remote-sheet dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub dataset_id: DatasetId,
    pub row_count: usize,
    pub headers: Vec<String>,
    pub sync_count: u32,
    pub changes: ChangeSummary,
}

/// Result of importing a sheet URL.
///
/// `changes` is present when the URL was already imported by the same owner
/// and the existing dataset was refreshed instead of duplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub dataset_id: DatasetId,
    pub row_count: usize,
    pub headers: Vec<String>,
    pub sync_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<ChangeSummary>,
}

impl ImportResult {
    /// True when the import created a new dataset.
    pub fn is_new(&self) -> bool {
        self.changes.is_none()
    }
}

impl From<SyncResult> for ImportResult {
    fn from(result: SyncResult) -> Self {
        Self {
            dataset_id: result.dataset_id,
            row_count: result.row_count,
            headers: result.headers,
            sync_count: result.sync_count,
            changes: Some(result.changes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_type_from_delta() {
        assert_eq!(ChangeType::from_delta(3), ChangeType::Added);
        assert_eq!(ChangeType::from_delta(-1), ChangeType::Removed);
        assert_eq!(ChangeType::from_delta(0), ChangeType::NoChange);
    }

    #[test]
    fn test_change_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&ChangeType::NoChange).unwrap(),
            "\"no change\""
        );
        assert_eq!(serde_json::to_string(&ChangeType::Added).unwrap(), "\"added\"");
    }
}
