//! The owner-scoped store contract.

use std::future::Future;

use dsync_model::{Dataset, DatasetId, NewDataset, OwnerId, TableContent};

use crate::error::{PersistenceError, Result};

/// Durable home of dataset records.
///
/// Every lookup and mutation is scoped by owner. A record owned by someone
/// else is reported exactly like a missing one (`None` / `false`).
pub trait DatasetStore: Send + Sync {
    /// Assigns an id and timestamps, then persists the record.
    fn create(&self, input: NewDataset) -> impl Future<Output = Result<Dataset>> + Send;

    fn find_by_id(
        &self,
        owner: &OwnerId,
        id: DatasetId,
    ) -> impl Future<Output = Result<Option<Dataset>>> + Send;

    /// Secondary lookup of a remote-sheet dataset by its share URL.
    fn find_by_sheet_url(
        &self,
        owner: &OwnerId,
        sheet_url: &str,
    ) -> impl Future<Output = Result<Option<Dataset>>> + Send;

    /// All datasets of `owner`, newest `uploaded_at` first.
    fn list_by_owner(&self, owner: &OwnerId) -> impl Future<Output = Result<Vec<Dataset>>> + Send;

    /// Swaps headers and rows as one document replace and records the sync.
    fn replace_content(
        &self,
        owner: &OwnerId,
        id: DatasetId,
        content: TableContent,
    ) -> impl Future<Output = Result<Option<Dataset>>> + Send;

    /// Removes the record. Returns `false` when nothing matched.
    fn delete(&self, owner: &OwnerId, id: DatasetId) -> impl Future<Output = Result<bool>> + Send;
}

/// Rejects content that must never be persisted.
pub(crate) fn ensure_not_empty(content: &TableContent) -> Result<()> {
    if content.is_empty() {
        return Err(PersistenceError::EmptyContent {
            headers: content.headers.len(),
            rows: content.rows.len(),
        });
    }
    Ok(())
}

/// True when `dataset` is the remote import of `sheet_url` by `owner`.
pub(crate) fn matches_sheet(dataset: &Dataset, owner: &OwnerId, sheet_url: &str) -> bool {
    dataset.is_owned_by(owner)
        && dataset.source().is_remote()
        && dataset.sheet_url() == Some(sheet_url)
}

/// Newest first; ties broken by id so listings are stable.
pub(crate) fn sort_newest_first(datasets: &mut [Dataset]) {
    datasets.sort_by(|a, b| {
        b.uploaded_at()
            .cmp(&a.uploaded_at())
            .then_with(|| a.id().cmp(&b.id()))
    });
}
