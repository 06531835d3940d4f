//! In-process store backed by a locked map.

use std::collections::HashMap;

use chrono::Utc;
use dsync_model::{Dataset, DatasetId, NewDataset, OwnerId, TableContent};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::store::{DatasetStore, ensure_not_empty, matches_sheet, sort_newest_first};

/// Keeps every dataset in memory.
///
/// Content replacement happens under the write lock, so readers observe
/// either the old or the new headers and rows, never a mix.
#[derive(Debug, Default)]
pub struct MemoryStore {
    datasets: RwLock<HashMap<DatasetId, Dataset>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records across all owners.
    pub async fn len(&self) -> usize {
        self.datasets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.datasets.read().await.is_empty()
    }
}

impl DatasetStore for MemoryStore {
    async fn create(&self, input: NewDataset) -> Result<Dataset> {
        ensure_not_empty(&input.content)?;
        let dataset = Dataset::create(DatasetId::generate(), input, Utc::now());

        self.datasets
            .write()
            .await
            .insert(dataset.id(), dataset.clone());

        tracing::debug!(dataset_id = %dataset.id(), "Stored dataset in memory");
        Ok(dataset)
    }

    async fn find_by_id(&self, owner: &OwnerId, id: DatasetId) -> Result<Option<Dataset>> {
        Ok(self
            .datasets
            .read()
            .await
            .get(&id)
            .filter(|dataset| dataset.is_owned_by(owner))
            .cloned())
    }

    async fn find_by_sheet_url(&self, owner: &OwnerId, sheet_url: &str) -> Result<Option<Dataset>> {
        Ok(self
            .datasets
            .read()
            .await
            .values()
            .find(|dataset| matches_sheet(dataset, owner, sheet_url))
            .cloned())
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<Dataset>> {
        let mut datasets: Vec<Dataset> = self
            .datasets
            .read()
            .await
            .values()
            .filter(|dataset| dataset.is_owned_by(owner))
            .cloned()
            .collect();
        sort_newest_first(&mut datasets);
        Ok(datasets)
    }

    async fn replace_content(
        &self,
        owner: &OwnerId,
        id: DatasetId,
        content: TableContent,
    ) -> Result<Option<Dataset>> {
        ensure_not_empty(&content)?;

        let mut datasets = self.datasets.write().await;
        let Some(dataset) = datasets.get_mut(&id).filter(|d| d.is_owned_by(owner)) else {
            return Ok(None);
        };
        dataset.replace_content(content, Utc::now());
        Ok(Some(dataset.clone()))
    }

    async fn delete(&self, owner: &OwnerId, id: DatasetId) -> Result<bool> {
        let mut datasets = self.datasets.write().await;
        if !datasets.get(&id).is_some_and(|d| d.is_owned_by(owner)) {
            return Ok(false);
        }
        datasets.remove(&id);
        Ok(true)
    }
}
