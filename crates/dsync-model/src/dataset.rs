//! The persisted dataset record.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::cell::Row;
use crate::ids::{DatasetId, OwnerId};

/// How a dataset's content arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatasetSource {
    /// Uploaded `.csv` file.
    Csv,
    /// Uploaded `.xlsx` / `.xls` workbook.
    SpreadsheetFile,
    /// Live spreadsheet share URL, re-fetched on sync.
    RemoteSheet,
}

impl DatasetSource {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::SpreadsheetFile => "spreadsheet-file",
            Self::RemoteSheet => "remote-sheet",
        }
    }

    /// Whether datasets of this source can be re-synced.
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteSheet)
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized table content: ordered headers plus rows keyed by them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableContent {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl TableContent {
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self { headers, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when there is nothing worth persisting (no headers or no rows).
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() || self.rows.is_empty()
    }

    /// SHA-256 over headers (in order) and rows (in order), hex encoded.
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        for header in &self.headers {
            hasher.update(header.as_bytes());
            hasher.update([0x1f]);
        }
        hasher.update([0x1e]);
        for row in &self.rows {
            for value in row.values_in(&self.headers) {
                // serde_json output for a scalar is stable and type-tagged by shape
                let encoded = serde_json::to_vec(value).unwrap_or_default();
                hasher.update(&encoded);
                hasher.update([0x1f]);
            }
            hasher.update([0x1e]);
        }
        hex::encode(hasher.finalize())
    }
}

/// Input for creating a dataset record.
#[derive(Debug, Clone)]
pub struct NewDataset {
    pub owner_id: OwnerId,
    pub source: DatasetSource,
    pub content: TableContent,
    /// Required for `RemoteSheet`, ignored otherwise.
    pub sheet_url: Option<String>,
    /// Original upload file name, if any.
    pub file_name: Option<String>,
}

impl NewDataset {
    /// Creates input for an uploaded file.
    pub fn upload(
        owner_id: OwnerId,
        source: DatasetSource,
        content: TableContent,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            owner_id,
            source,
            content,
            sheet_url: None,
            file_name: Some(file_name.into()),
        }
    }

    /// Creates input for a remote sheet import.
    pub fn remote(owner_id: OwnerId, sheet_url: impl Into<String>, content: TableContent) -> Self {
        Self {
            owner_id,
            source: DatasetSource::RemoteSheet,
            content,
            sheet_url: Some(sheet_url.into()),
            file_name: None,
        }
    }
}

/// A tenant-owned normalized table.
///
/// The row count is always derived from `rows`; it is never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    id: DatasetId,
    owner_id: OwnerId,
    source: DatasetSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sheet_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_name: Option<String>,
    headers: Vec<String>,
    rows: Vec<Row>,
    uploaded_at: DateTime<Utc>,
    last_synced_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sync_count: Option<u32>,
    content_hash: String,
}

impl Dataset {
    /// Builds a fresh record from creation input.
    ///
    /// `sync_count` starts at 1 for remote sheets and is absent otherwise.
    /// `sheet_url` is kept only for remote sheets.
    pub fn create(id: DatasetId, input: NewDataset, now: DateTime<Utc>) -> Self {
        let remote = input.source.is_remote();
        let content_hash = input.content.content_hash();
        Self {
            id,
            owner_id: input.owner_id,
            source: input.source,
            sheet_url: if remote { input.sheet_url } else { None },
            file_name: input.file_name,
            headers: input.content.headers,
            rows: input.content.rows,
            uploaded_at: now,
            last_synced_at: now,
            sync_count: remote.then_some(1),
            content_hash,
        }
    }

    /// Replaces headers and rows wholesale and records a successful sync.
    ///
    /// `last_synced_at` is guaranteed to move forward even if the clock
    /// reports the same instant twice.
    pub fn replace_content(&mut self, content: TableContent, now: DateTime<Utc>) {
        self.content_hash = content.content_hash();
        self.headers = content.headers;
        self.rows = content.rows;
        self.last_synced_at = if now > self.last_synced_at {
            now
        } else {
            self.last_synced_at + TimeDelta::nanoseconds(1)
        };
        self.sync_count = Some(self.sync_count.unwrap_or(0) + 1);
    }

    pub fn id(&self) -> DatasetId {
        self.id
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    /// True if `owner` may see and mutate this dataset.
    pub fn is_owned_by(&self, owner: &OwnerId) -> bool {
        &self.owner_id == owner
    }

    pub fn source(&self) -> DatasetSource {
        self.source
    }

    pub fn sheet_url(&self) -> Option<&str> {
        self.sheet_url.as_deref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }

    pub fn last_synced_at(&self) -> DateTime<Utc> {
        self.last_synced_at
    }

    pub fn sync_count(&self) -> Option<u32> {
        self.sync_count
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// The first `limit` rows, e.g. for previews or prompt samples.
    pub fn sample_rows(&self, limit: usize) -> &[Row] {
        &self.rows[..self.rows.len().min(limit)]
    }

    /// Metadata-only view (no rows).
    pub fn overview(&self) -> DatasetOverview {
        DatasetOverview {
            id: self.id,
            source: self.source,
            sheet_url: self.sheet_url.clone(),
            file_name: self.file_name.clone(),
            headers: self.headers.clone(),
            row_count: self.row_count(),
            uploaded_at: self.uploaded_at,
            last_synced_at: self.last_synced_at,
            sync_count: self.sync_count,
        }
    }
}

/// Dataset metadata without row content, as returned by listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetOverview {
    pub id: DatasetId,
    pub source: DatasetSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub headers: Vec<String>,
    pub row_count: usize,
    pub uploaded_at: DateTime<Utc>,
    pub last_synced_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellValue;

    fn content(rows: usize) -> TableContent {
        let headers = vec!["a".to_string(), "b".to_string()];
        let rows = (0..rows)
            .map(|i| {
                Row::from_cells(
                    &headers,
                    vec![CellValue::Number(i as f64), CellValue::text("x")],
                    &CellValue::Empty,
                )
            })
            .collect();
        TableContent::new(headers, rows)
    }

    #[test]
    fn test_create_upload_has_no_sync_count() {
        let now = Utc::now();
        let ds = Dataset::create(
            DatasetId::generate(),
            NewDataset::upload(OwnerId::new("u1"), DatasetSource::Csv, content(2), "a.csv"),
            now,
        );
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.sync_count(), None);
        assert_eq!(ds.sheet_url(), None);
        assert_eq!(ds.uploaded_at(), ds.last_synced_at());
    }

    #[test]
    fn test_create_remote_starts_sync_count_at_one() {
        let ds = Dataset::create(
            DatasetId::generate(),
            NewDataset::remote(OwnerId::new("u1"), "https://x/d/abc/edit", content(1)),
            Utc::now(),
        );
        assert_eq!(ds.sync_count(), Some(1));
        assert_eq!(ds.sheet_url(), Some("https://x/d/abc/edit"));
    }

    #[test]
    fn test_replace_content_moves_clock_forward() {
        let now = Utc::now();
        let mut ds = Dataset::create(
            DatasetId::generate(),
            NewDataset::remote(OwnerId::new("u1"), "https://x/d/abc/edit", content(1)),
            now,
        );
        ds.replace_content(content(3), now);
        assert!(ds.last_synced_at() > now);
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.sync_count(), Some(2));
    }

    #[test]
    fn test_content_hash_sensitive_to_values() {
        let a = content(2);
        let mut b = content(2);
        b.rows[1] = Row::from_cells(
            &b.headers,
            vec![CellValue::Number(9.0), CellValue::text("x")],
            &CellValue::Empty,
        );
        assert_ne!(a.content_hash(), b.content_hash());
        assert_eq!(a.content_hash(), content(2).content_hash());
    }

    #[test]
    fn test_serialized_record_has_no_row_count_field() {
        let ds = Dataset::create(
            DatasetId::generate(),
            NewDataset::upload(OwnerId::new("u1"), DatasetSource::Csv, content(1), "a.csv"),
            Utc::now(),
        );
        let json = serde_json::to_value(&ds).unwrap();
        assert!(json.get("rowCount").is_none());
        assert_eq!(json["source"], "csv");

        let overview = serde_json::to_value(ds.overview()).unwrap();
        assert_eq!(overview["rowCount"], 1);
    }
}
