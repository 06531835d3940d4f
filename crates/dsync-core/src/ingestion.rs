//! Creating datasets from uploaded files.

use std::path::PathBuf;
use std::sync::Arc;

use dsync_ingest::{TabularFormat, check_size};
use dsync_model::{IngestResult, NewDataset, OwnerId};
use dsync_persistence::DatasetStore;
use tracing::instrument;

use crate::config::HubConfig;
use crate::error::Result;
use crate::parse::parse_bounded;
use crate::staging::StagedUpload;

/// Turns uploaded files into stored datasets.
#[derive(Debug)]
pub struct IngestionService<S> {
    store: Arc<S>,
    config: HubConfig,
    staging_dir: Option<PathBuf>,
}

impl<S> Clone for IngestionService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
            staging_dir: self.staging_dir.clone(),
        }
    }
}

impl<S: DatasetStore> IngestionService<S> {
    pub fn new(store: Arc<S>, config: HubConfig) -> Self {
        Self {
            store,
            config,
            staging_dir: None,
        }
    }

    /// Stage uploads in `dir` instead of the system temp directory.
    #[must_use]
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    /// Rejects an upload by name and size alone, before its bytes are read.
    pub fn check_upload(&self, file_name: &str, size: u64) -> Result<TabularFormat> {
        let format = TabularFormat::from_file_name(file_name)?;
        check_size(size, self.config.max_upload_bytes)?;
        Ok(format)
    }

    /// Ingests an uploaded file held in memory.
    ///
    /// The extension and size are checked before anything is written. The
    /// bytes are then staged to a temp file which is gone again when this
    /// returns, whatever the outcome.
    #[instrument(skip(self, bytes), fields(owner = %owner, bytes = bytes.len()))]
    pub async fn ingest_upload(
        &self,
        owner: &OwnerId,
        bytes: &[u8],
        file_name: &str,
    ) -> Result<IngestResult> {
        self.check_upload(file_name, bytes.len() as u64)?;

        let staged = StagedUpload::stage(self.staging_dir.as_deref(), bytes, file_name)?;
        self.ingest_staged(owner, staged).await
    }

    /// Ingests an upload the transport already spooled to disk.
    ///
    /// Takes ownership of the staged file and releases it on every path.
    #[instrument(skip(self, staged), fields(owner = %owner, file = staged.file_name()))]
    pub async fn ingest_staged(&self, owner: &OwnerId, staged: StagedUpload) -> Result<IngestResult> {
        let result = self.process(owner, &staged).await;

        if let Err(e) = staged.close() {
            tracing::warn!(error = %e, "Failed to remove staged upload");
        }

        match &result {
            Ok(ingested) => tracing::info!(
                dataset_id = %ingested.dataset_id,
                rows = ingested.row_count,
                "Ingested upload"
            ),
            Err(e) => tracing::warn!(kind = %e.kind(), error = %e, "Upload rejected"),
        }
        result
    }

    async fn process(&self, owner: &OwnerId, staged: &StagedUpload) -> Result<IngestResult> {
        let format = self.check_upload(staged.file_name(), staged.size())?;

        let bytes = staged.read().await?;
        let content = parse_bounded(
            bytes,
            format,
            self.config.parser.clone(),
            self.config.parse_timeout(),
        )
        .await?;

        let input = NewDataset::upload(
            owner.clone(),
            format.upload_source(),
            content,
            staged.file_name(),
        );
        let dataset = self.store.create(input).await?;
        Ok(IngestResult::from(&dataset))
    }
}
