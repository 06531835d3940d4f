//! Boundary operations over one store and one sheet source.

use std::path::PathBuf;
use std::sync::Arc;

use dsync_model::{
    Dataset, DatasetId, DatasetOverview, DatasetSummary, ImportResult, IngestResult, OwnerId,
    SyncResult,
};
use dsync_persistence::DatasetStore;
use dsync_remote::SheetSource;

use crate::cache::SummaryCache;
use crate::config::HubConfig;
use crate::error::{DatasetError, Result};
use crate::ingestion::IngestionService;
use crate::staging::StagedUpload;
use crate::sync::SyncService;

/// Resolves a client-supplied dataset id.
///
/// A malformed id cannot name any dataset, so it is reported as
/// [`DatasetError::NotFound`] like every other miss.
pub fn resolve_dataset_id(raw: &str) -> Result<DatasetId> {
    raw.trim().parse().map_err(|_| DatasetError::NotFound)
}

/// Every operation a transport exposes, scoped to the calling owner.
///
/// The services stay private so every content change passes through the
/// hub and invalidates the summary cache.
#[derive(Debug)]
pub struct DatasetHub<S, F> {
    store: Arc<S>,
    ingestion: IngestionService<S>,
    sync: SyncService<S, F>,
    summaries: Option<Arc<SummaryCache>>,
}

impl<S: DatasetStore, F: SheetSource> DatasetHub<S, F> {
    /// Wires the services together. The summary cache is built from
    /// `config` and left out when its capacity is zero.
    pub fn new(store: Arc<S>, fetcher: Arc<F>, config: HubConfig) -> Self {
        let summaries = SummaryCache::from_settings(
            config.summary_cache_capacity,
            config.summary_cache_ttl(),
        )
        .map(Arc::new);

        Self {
            ingestion: IngestionService::new(Arc::clone(&store), config.clone()),
            sync: SyncService::new(Arc::clone(&store), fetcher, config),
            store,
            summaries,
        }
    }

    /// Replaces the summary cache, e.g. to share one between hubs or to
    /// run without any.
    #[must_use]
    pub fn with_summary_cache(mut self, cache: Option<Arc<SummaryCache>>) -> Self {
        self.summaries = cache;
        self
    }

    #[must_use]
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.ingestion = self.ingestion.with_staging_dir(dir);
        self
    }

    // === Uploads ===

    /// Checks an upload's name and size so a transport can refuse it
    /// without reading the body.
    pub fn check_upload(&self, file_name: &str, size: u64) -> Result<()> {
        self.ingestion.check_upload(file_name, size).map(|_| ())
    }

    pub async fn upload(&self, owner: &OwnerId, bytes: &[u8], file_name: &str) -> Result<IngestResult> {
        self.ingestion.ingest_upload(owner, bytes, file_name).await
    }

    pub async fn upload_staged(&self, owner: &OwnerId, staged: StagedUpload) -> Result<IngestResult> {
        self.ingestion.ingest_staged(owner, staged).await
    }

    // === Reads ===

    /// Overviews of the owner's datasets, newest first.
    pub async fn list(&self, owner: &OwnerId) -> Result<Vec<DatasetOverview>> {
        let datasets = self.store.list_by_owner(owner).await?;
        Ok(datasets.iter().map(Dataset::overview).collect())
    }

    pub async fn get(&self, owner: &OwnerId, id: DatasetId) -> Result<Dataset> {
        self.store
            .find_by_id(owner, id)
            .await?
            .ok_or(DatasetError::NotFound)
    }

    /// Column profile of a dataset, served from the cache when fresh.
    pub async fn summary(&self, owner: &OwnerId, id: DatasetId) -> Result<Arc<DatasetSummary>> {
        if let Some(cached) = self.summaries.as_ref().and_then(|c| c.get(owner, id)) {
            tracing::debug!(dataset_id = %id, "Summary cache hit");
            return Ok(cached);
        }

        let generation = self.summaries.as_deref().map(SummaryCache::generation);
        let dataset = self.get(owner, id).await?;
        let summary = Arc::new(DatasetSummary::from_dataset(&dataset));
        if let (Some(cache), Some(generation)) = (&self.summaries, generation)
            && !cache.insert(owner, id, Arc::clone(&summary), generation)
        {
            tracing::debug!(dataset_id = %id, "Dataset changed while summarizing; not cached");
        }
        Ok(summary)
    }

    // === Mutations ===

    /// Deletes a dataset. A miss is [`DatasetError::NotFound`].
    pub async fn delete(&self, owner: &OwnerId, id: DatasetId) -> Result<()> {
        let removed = self.store.delete(owner, id).await?;
        self.invalidate(owner, id);
        if !removed {
            return Err(DatasetError::NotFound);
        }
        tracing::info!(dataset_id = %id, "Dataset deleted");
        Ok(())
    }

    pub async fn import_from_url(&self, owner: &OwnerId, sheet_url: &str) -> Result<ImportResult> {
        let result = self.sync.import_from_url(owner, sheet_url).await?;
        if !result.is_new() {
            self.invalidate(owner, result.dataset_id);
        }
        Ok(result)
    }

    pub async fn resync(&self, owner: &OwnerId, id: DatasetId) -> Result<SyncResult> {
        let result = self.sync.resync(owner, id).await?;
        self.invalidate(owner, id);
        Ok(result)
    }

    fn invalidate(&self, owner: &OwnerId, id: DatasetId) {
        if let Some(cache) = &self.summaries {
            cache.invalidate(owner, id);
        }
    }
}
