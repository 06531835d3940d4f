//! Directory-backed store: one JSON document per dataset.
//!
//! ```text
//! <root>/
//! └── datasets/
//!     ├── 0b6c…e1.json
//!     └── 7f3a…90.json
//! ```

mod document;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dsync_model::{Dataset, DatasetId, NewDataset, OwnerId, TableContent};
use tokio::sync::Mutex;

use crate::error::{PersistenceError, Result};
use crate::store::{DatasetStore, ensure_not_empty, matches_sheet, sort_newest_first};

use document::{
    DOCUMENT_EXTENSION, read_owned_document, read_owned_documents, remove_document,
    remove_stale_temp_files, write_document,
};

const DATASETS_DIR: &str = "datasets";

/// Temp files younger than this are left alone on open.
pub const STALE_TEMP_AGE: Duration = Duration::from_secs(10 * 60);

/// Stores each dataset as `<root>/datasets/<id>.json`.
///
/// Mutations are serialized by a write lock and land through temp file +
/// rename. Reads take no lock. Blocking file I/O runs on the blocking pool.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: Arc<PathBuf>,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileStore {
    /// Opens (creating if needed) a store rooted at `root`.
    ///
    /// Temp files left by an interrupted write are removed once they are
    /// older than [`STALE_TEMP_AGE`].
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let dir = root.as_ref().join(DATASETS_DIR);
        fs::create_dir_all(&dir).map_err(|e| PersistenceError::Io {
            operation: "create directory",
            path: dir.clone(),
            source: e,
        })?;

        let removed = remove_stale_temp_files(&dir, STALE_TEMP_AGE)?;
        if removed > 0 {
            tracing::warn!(files = removed, "Removed stale temp files from dataset store");
        }

        tracing::info!("Opened dataset store at {}", dir.display());
        Ok(Self {
            dir: Arc::new(dir),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Directory holding the dataset documents.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn document_path(&self, id: DatasetId) -> PathBuf {
        self.dir.join(format!("{id}.{DOCUMENT_EXTENSION}"))
    }

    async fn load_owned(&self, owner: &OwnerId, id: DatasetId) -> Result<Option<Dataset>> {
        let path = self.document_path(id);
        let owner = owner.clone();
        blocking(move || read_owned_document(&path, &owner)).await
    }

    async fn load_all_owned(&self, owner: &OwnerId) -> Result<Vec<Dataset>> {
        let dir = Arc::clone(&self.dir);
        let owner = owner.clone();
        blocking(move || read_owned_documents(&dir, &owner)).await
    }

    async fn save(&self, dataset: Dataset) -> Result<Dataset> {
        let path = self.document_path(dataset.id());
        blocking(move || write_document(&path, &dataset).map(|()| dataset)).await
    }
}

impl DatasetStore for JsonFileStore {
    async fn create(&self, input: NewDataset) -> Result<Dataset> {
        ensure_not_empty(&input.content)?;
        let dataset = Dataset::create(DatasetId::generate(), input, Utc::now());

        let _guard = self.write_lock.lock().await;
        let dataset = self.save(dataset).await?;

        tracing::info!(dataset_id = %dataset.id(), rows = dataset.row_count(), "Created dataset");
        Ok(dataset)
    }

    async fn find_by_id(&self, owner: &OwnerId, id: DatasetId) -> Result<Option<Dataset>> {
        self.load_owned(owner, id).await
    }

    async fn find_by_sheet_url(&self, owner: &OwnerId, sheet_url: &str) -> Result<Option<Dataset>> {
        Ok(self
            .load_all_owned(owner)
            .await?
            .into_iter()
            .find(|dataset| matches_sheet(dataset, owner, sheet_url)))
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<Dataset>> {
        let mut datasets = self.load_all_owned(owner).await?;
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

        let _guard = self.write_lock.lock().await;
        let Some(mut dataset) = self.load_owned(owner, id).await? else {
            return Ok(None);
        };
        dataset.replace_content(content, Utc::now());
        let dataset = self.save(dataset).await?;

        tracing::info!(
            dataset_id = %id,
            rows = dataset.row_count(),
            sync_count = dataset.sync_count(),
            "Replaced dataset content"
        );
        Ok(Some(dataset))
    }

    async fn delete(&self, owner: &OwnerId, id: DatasetId) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        if self.load_owned(owner, id).await?.is_none() {
            return Ok(false);
        }

        let path = self.document_path(id);
        let removed = blocking(move || remove_document(&path)).await?;
        if removed {
            tracing::info!(dataset_id = %id, "Deleted dataset");
        }
        Ok(removed)
    }
}

/// Runs blocking file I/O off the async runtime.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| PersistenceError::Task { source: e })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsync_model::{CellValue, DatasetSource, Row};
    use std::time::SystemTime;
    use tempfile::tempdir;

    fn content() -> TableContent {
        let headers = vec!["a".to_string(), "b".to_string()];
        let rows = vec![Row::from_cells(
            &headers,
            [CellValue::Number(1.0), CellValue::text("x")],
            &CellValue::Empty,
        )];
        TableContent::new(headers, rows)
    }

    #[tokio::test]
    async fn test_document_layout() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        let dataset = store
            .create(NewDataset::upload(
                OwnerId::from("ada"),
                DatasetSource::Csv,
                content(),
                "t.csv",
            ))
            .await
            .unwrap();

        let path = dir
            .path()
            .join("datasets")
            .join(format!("{}.json", dataset.id()));
        assert!(path.exists());

        let raw: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["ownerId"], "ada");
        assert_eq!(raw["source"], "csv");
        assert_eq!(raw["rows"][0]["a"], 1.0);
        assert!(raw.get("rowCount").is_none());
    }

    fn backdate(path: &Path, age: Duration) {
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    #[tokio::test]
    async fn test_open_removes_stale_temp_files() {
        let dir = tempdir().unwrap();
        let datasets = dir.path().join("datasets");
        fs::create_dir_all(&datasets).unwrap();
        let stale = datasets.join("abc.json.tmp");
        fs::write(&stale, b"{").unwrap();
        backdate(&stale, STALE_TEMP_AGE + Duration::from_secs(60));

        let store = JsonFileStore::open(dir.path()).unwrap();
        assert!(!stale.exists());
        assert!(
            store
                .list_by_owner(&OwnerId::from("ada"))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_open_keeps_fresh_temp_files() {
        let dir = tempdir().unwrap();
        let datasets = dir.path().join("datasets");
        fs::create_dir_all(&datasets).unwrap();
        let in_flight = datasets.join("def.json.tmp");
        fs::write(&in_flight, b"{\"ownerId\"").unwrap();

        JsonFileStore::open(dir.path()).unwrap();
        assert!(in_flight.exists());
    }

    #[tokio::test]
    async fn test_damaged_own_document_is_reported() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        let id = DatasetId::generate();
        fs::write(store.document_path(id), br#"{"ownerId":"ada","rows":"oops"}"#).unwrap();

        let result = store.find_by_id(&OwnerId::from("ada"), id).await;
        assert!(matches!(
            result,
            Err(PersistenceError::Deserialization { .. })
        ));

        let foreign = store.find_by_id(&OwnerId::from("lin"), id).await.unwrap();
        assert!(foreign.is_none());
        assert!(
            store
                .list_by_owner(&OwnerId::from("ada"))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_unattributable_document_is_skipped() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        let id = DatasetId::generate();
        fs::write(store.document_path(id), b"not json").unwrap();

        let found = store.find_by_id(&OwnerId::from("ada"), id).await.unwrap();
        assert!(found.is_none());
    }
}
