//! Importing and refreshing remote-sheet datasets.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use dsync_ingest::{TabularFormat, check_size};
use dsync_model::{
    ChangeSummary, Dataset, DatasetId, ImportResult, NewDataset, OwnerId, SyncResult, TableContent,
};
use dsync_persistence::DatasetStore;
use dsync_remote::{SheetSource, extract_sheet_id};
use tracing::instrument;

use crate::config::HubConfig;
use crate::error::{DatasetError, Result};
use crate::parse::parse_bounded;

type ImportKey = (OwnerId, String);

/// One async lock per `(owner, sheet URL)` being imported.
///
/// Entries hold weak references and are pruned once no import holds them.
#[derive(Debug, Default)]
struct ImportLocks {
    locks: Mutex<HashMap<ImportKey, Weak<tokio::sync::Mutex<()>>>>,
}

impl ImportLocks {
    fn lock_for(&self, owner: &OwnerId, sheet_url: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|_, lock| lock.strong_count() > 0);

        let key = (owner.clone(), sheet_url.to_string());
        if let Some(lock) = locks.get(&key).and_then(Weak::upgrade) {
            return lock;
        }
        let lock = Arc::new(tokio::sync::Mutex::new(()));
        locks.insert(key, Arc::downgrade(&lock));
        lock
    }
}

/// Keeps remote-sheet datasets in step with their source.
///
/// Content is only written after a fetch and parse have both succeeded;
/// any earlier failure leaves the stored dataset exactly as it was.
#[derive(Debug)]
pub struct SyncService<S, F> {
    store: Arc<S>,
    fetcher: Arc<F>,
    config: HubConfig,
    imports: Arc<ImportLocks>,
}

impl<S, F> Clone for SyncService<S, F> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            fetcher: Arc::clone(&self.fetcher),
            config: self.config.clone(),
            imports: Arc::clone(&self.imports),
        }
    }
}

impl<S: DatasetStore, F: SheetSource> SyncService<S, F> {
    pub fn new(store: Arc<S>, fetcher: Arc<F>, config: HubConfig) -> Self {
        Self {
            store,
            fetcher,
            config,
            imports: Arc::default(),
        }
    }

    /// Imports a sheet, or refreshes it if this owner imported it before.
    ///
    /// The URL is compared after trimming surrounding whitespace. Imports
    /// of the same URL by the same owner run one at a time, so concurrent
    /// calls yield one dataset.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn import_from_url(&self, owner: &OwnerId, sheet_url: &str) -> Result<ImportResult> {
        let sheet_url = sheet_url.trim();
        extract_sheet_id(sheet_url)?;

        let lock = self.imports.lock_for(owner, sheet_url);
        let _guard = lock.lock().await;

        if let Some(existing) = self.store.find_by_sheet_url(owner, sheet_url).await? {
            tracing::debug!(dataset_id = %existing.id(), "Sheet already imported, refreshing");
            return self.refresh(owner, existing).await.map(ImportResult::from);
        }

        let content = self.fetch_table(sheet_url).await?;
        let dataset = self
            .store
            .create(NewDataset::remote(owner.clone(), sheet_url, content))
            .await?;

        tracing::info!(
            dataset_id = %dataset.id(),
            rows = dataset.row_count(),
            "Imported remote sheet"
        );
        Ok(ImportResult {
            dataset_id: dataset.id(),
            row_count: dataset.row_count(),
            headers: dataset.headers().to_vec(),
            sync_count: dataset.sync_count().unwrap_or(1),
            changes: None,
        })
    }

    /// Re-fetches a remote-sheet dataset and replaces its content.
    #[instrument(skip(self), fields(owner = %owner, dataset_id = %id))]
    pub async fn resync(&self, owner: &OwnerId, id: DatasetId) -> Result<SyncResult> {
        let dataset = self
            .store
            .find_by_id(owner, id)
            .await?
            .ok_or(DatasetError::NotFound)?;
        self.refresh(owner, dataset).await
    }

    async fn refresh(&self, owner: &OwnerId, dataset: Dataset) -> Result<SyncResult> {
        let Some(sheet_url) = dataset.sheet_url() else {
            return Err(DatasetError::InvalidOperation(format!(
                "dataset {} was uploaded as {} and has no remote sheet",
                dataset.id(),
                dataset.source()
            )));
        };

        let content = self.fetch_table(sheet_url).await?;
        let changes = ChangeSummary::between(&dataset, &content);

        // The record may have been deleted while we were fetching
        let updated = self
            .store
            .replace_content(owner, dataset.id(), content)
            .await?
            .ok_or(DatasetError::NotFound)?;

        tracing::info!(
            dataset_id = %updated.id(),
            change = changes.change_type.label(),
            rows_changed = changes.rows_changed,
            headers_changed = changes.headers_changed,
            "Resynced remote sheet"
        );
        Ok(SyncResult {
            dataset_id: updated.id(),
            row_count: updated.row_count(),
            headers: updated.headers().to_vec(),
            sync_count: updated.sync_count().unwrap_or(1),
            changes,
        })
    }

    /// Fetch + parse, each under its own deadline.
    async fn fetch_table(&self, sheet_url: &str) -> Result<TableContent> {
        let limit = self.config.fetch_timeout();
        let bytes = tokio::time::timeout(limit, self.fetcher.fetch_csv(sheet_url))
            .await
            .map_err(|_| DatasetError::FetchTimeout {
                seconds: limit.as_secs(),
            })??;
        check_size(bytes.len() as u64, self.config.max_export_bytes)?;

        parse_bounded(
            bytes,
            TabularFormat::Csv,
            self.config.parser.clone(),
            self.config.parse_timeout(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_locks_are_shared_per_key() {
        let locks = ImportLocks::default();
        let ada = OwnerId::from("ada");

        let first = locks.lock_for(&ada, "https://sheet/a");
        let same = locks.lock_for(&ada, "https://sheet/a");
        let other_url = locks.lock_for(&ada, "https://sheet/b");
        let other_owner = locks.lock_for(&OwnerId::from("lin"), "https://sheet/a");

        assert!(Arc::ptr_eq(&first, &same));
        assert!(!Arc::ptr_eq(&first, &other_url));
        assert!(!Arc::ptr_eq(&first, &other_owner));
    }

    #[test]
    fn test_import_locks_are_pruned_when_released() {
        let locks = ImportLocks::default();
        let ada = OwnerId::from("ada");
        drop(locks.lock_for(&ada, "https://sheet/a"));
        drop(locks.lock_for(&ada, "https://sheet/b"));

        let _held = locks.lock_for(&ada, "https://sheet/c");
        assert_eq!(locks.locks.lock().unwrap().len(), 1);
    }
}
