//! Data model types for tenant-scoped tabular datasets.
//!
//! Every dataset, whatever its origin (uploaded CSV, uploaded workbook or a
//! remote spreadsheet), is normalized into the same shape: an ordered list of
//! headers plus an ordered list of rows keyed by those headers.
//!
//! # Module Organization
//!
//! - [`cell`]: Typed scalar cells and header-keyed rows
//! - [`dataset`]: The persisted [`Dataset`] record and its inputs
//! - [`ids`]: Owner and dataset identifiers
//! - [`outcome`]: Results reported by ingestion and sync operations
//! - [`summary`]: Per-column profile derived from dataset content

pub mod cell;
pub mod dataset;
pub mod ids;
pub mod outcome;
pub mod summary;

pub use cell::{CellValue, Row};
pub use dataset::{Dataset, DatasetOverview, DatasetSource, NewDataset, TableContent};
pub use ids::{DatasetId, InvalidDatasetId, OwnerId};
pub use outcome::{ChangeSummary, ChangeType, ImportResult, IngestResult, SyncResult};
pub use summary::{ColumnKind, ColumnProfile, DatasetSummary};
