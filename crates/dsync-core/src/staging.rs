//! Temporary storage for uploaded bytes.

use std::io::Write;
use std::path::Path;

use tempfile::{Builder, TempPath};

use crate::error::{DatasetError, Result};

const STAGED_PREFIX: &str = "dsync-upload-";

/// An uploaded file spooled to a temporary file for one ingestion call.
///
/// The file is deleted by [`close`](Self::close) or, failing that, on drop.
#[derive(Debug)]
pub struct StagedUpload {
    path: TempPath,
    file_name: String,
    size: u64,
}

impl StagedUpload {
    /// Writes `bytes` to a new temp file in `dir` (system temp dir if `None`).
    pub fn stage(dir: Option<&Path>, bytes: &[u8], file_name: impl Into<String>) -> Result<Self> {
        let mut builder = Builder::new();
        builder.prefix(STAGED_PREFIX);

        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(staging_err("create"))?;

        file.write_all(bytes).map_err(staging_err("write"))?;
        file.flush().map_err(staging_err("write"))?;

        let staged = Self {
            path: file.into_temp_path(),
            file_name: file_name.into(),
            size: bytes.len() as u64,
        };
        tracing::debug!(
            path = %staged.path().display(),
            bytes = staged.size,
            "Staged upload"
        );
        Ok(staged)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name the client gave the file; the format is derived from it.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Reads the staged bytes back.
    pub async fn read(&self) -> Result<Vec<u8>> {
        tokio::fs::read(self.path())
            .await
            .map_err(|source| DatasetError::Staging {
                operation: "read",
                source,
            })
    }

    /// Deletes the temp file now, reporting any failure.
    pub fn close(self) -> Result<()> {
        self.path.close().map_err(|source| DatasetError::Staging {
            operation: "delete",
            source,
        })
    }
}

fn staging_err(operation: &'static str) -> impl FnOnce(std::io::Error) -> DatasetError {
    move |source| DatasetError::Staging { operation, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_stage_read_close() {
        let dir = tempdir().unwrap();
        let staged = StagedUpload::stage(Some(dir.path()), b"a,b\n1,2\n", "t.csv").unwrap();

        let path = staged.path().to_path_buf();
        assert!(path.starts_with(dir.path()));
        assert!(path.exists());
        assert_eq!(staged.size(), 8);
        assert_eq!(staged.file_name(), "t.csv");
        assert_eq!(staged.read().await.unwrap(), b"a,b\n1,2\n");

        staged.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_removes_file() {
        let dir = tempdir().unwrap();
        let staged = StagedUpload::stage(Some(dir.path()), b"x", "t.csv").unwrap();
        let path = staged.path().to_path_buf();
        drop(staged);
        assert!(!path.exists());
    }
}
