//! Dataset ingestion and sync services.
//!
//! This crate ties the parser, the remote fetcher and a dataset store into
//! the operations a transport exposes:
//!
//! - **Upload**: file name + bytes become a stored dataset
//! - **Import**: a spreadsheet share URL becomes a stored dataset, or
//!   refreshes the one this owner already imported
//! - **Resync**: re-fetch a remote-sheet dataset and swap its content
//! - **Read/Delete/Summary**: owner-scoped access to stored datasets
//!
//! Every failure is a [`DatasetError`] with a stable [`ErrorKind`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use dsync_core::{DatasetHub, HubConfig};
//! use dsync_persistence::MemoryStore;
//! use dsync_remote::HttpSheetFetcher;
//!
//! let config = HubConfig::default();
//! let fetcher = HttpSheetFetcher::new(config.fetcher_config())?;
//! let hub = DatasetHub::new(Arc::new(MemoryStore::new()), Arc::new(fetcher), config);
//!
//! let owner = "user-1".into();
//! let ingested = hub.upload(&owner, b"name,age\nAda,30\n", "people.csv").await?;
//! assert_eq!(ingested.row_count, 1);
//! ```

mod cache;
mod config;
mod error;
mod hub;
mod ingestion;
mod parse;
mod staging;
mod sync;

pub use cache::SummaryCache;
pub use config::{DEFAULT_MAX_UPLOAD_BYTES, HubConfig};
pub use error::{DatasetError, ErrorKind, Result};
pub use hub::{DatasetHub, resolve_dataset_id};
pub use ingestion::IngestionService;
pub use staging::StagedUpload;
pub use sync::SyncService;
