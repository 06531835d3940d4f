//! Blocking document I/O for the file store.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use dsync_model::{Dataset, OwnerId};

use crate::error::{PersistenceError, Result};

pub(super) const DOCUMENT_EXTENSION: &str = "json";
pub(super) const TEMP_EXTENSION: &str = "json.tmp";

/// Writes a dataset document.
///
/// Uses atomic write (temp file + rename) so a concurrent reader sees
/// either the previous document or the new one.
pub(super) fn write_document(path: &Path, dataset: &Dataset) -> Result<()> {
    let bytes =
        serde_json::to_vec(dataset).map_err(|e| PersistenceError::Serialization { source: e })?;

    let temp_path = path.with_extension(TEMP_EXTENSION);

    let mut file = File::create(&temp_path).map_err(|e| PersistenceError::Io {
        operation: "create",
        path: temp_path.clone(),
        source: e,
    })?;

    file.write_all(&bytes).map_err(|e| PersistenceError::Io {
        operation: "write",
        path: temp_path.clone(),
        source: e,
    })?;

    file.sync_all().map_err(|e| PersistenceError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| PersistenceError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source: e,
    })?;

    tracing::debug!("Saved dataset document to {}", path.display());
    Ok(())
}

/// Reads the document at `path` if it belongs to `owner`.
///
/// A missing file, another owner's document and a document whose owner
/// cannot be determined are all `None`. Only a damaged document that
/// still names `owner` is reported as an error.
pub(super) fn read_owned_document(path: &Path, owner: &OwnerId) -> Result<Option<Dataset>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(PersistenceError::Io {
                operation: "read",
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    match serde_json::from_slice::<Dataset>(&bytes) {
        Ok(dataset) => Ok(Some(dataset).filter(|dataset| dataset.is_owned_by(owner))),
        Err(e) if document_owner(&bytes).as_deref() == Some(owner.as_str()) => {
            Err(PersistenceError::Deserialization {
                path: path.to_path_buf(),
                source: e,
            })
        }
        Err(e) => {
            tracing::warn!(error = %e, "Skipping unreadable dataset document {}", path.display());
            Ok(None)
        }
    }
}

/// Owner named by a document that may not match the dataset schema.
fn document_owner(bytes: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(bytes).ok()?;
    value.get("ownerId")?.as_str().map(str::to_string)
}

/// Deletes a dataset document. Returns `false` if it was already gone.
pub(super) fn remove_document(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(PersistenceError::Io {
            operation: "delete",
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Reads every document in `dir` that belongs to `owner`.
///
/// Documents that cannot be read or parsed are logged and skipped, so one
/// damaged record never fails a scan.
pub(super) fn read_owned_documents(dir: &Path, owner: &OwnerId) -> Result<Vec<Dataset>> {
    let mut datasets = Vec::new();
    for path in document_paths(dir)? {
        match read_owned_document(&path, owner) {
            Ok(Some(dataset)) => datasets.push(dataset),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Skipping dataset document during scan"),
        }
    }
    Ok(datasets)
}

/// Removes temp files left behind by an interrupted write.
///
/// Only files untouched for at least `min_age` are removed; younger ones
/// may belong to a write still in progress.
pub(super) fn remove_stale_temp_files(dir: &Path, min_age: Duration) -> Result<usize> {
    let mut removed = 0;
    for path in list_dir(dir)? {
        if is_temp_file(&path) && is_older_than(&path, min_age) && remove_document(&path)? {
            removed += 1;
        }
    }
    Ok(removed)
}

fn is_older_than(path: &Path, min_age: Duration) -> bool {
    fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .is_ok_and(|modified| modified.elapsed().is_ok_and(|age| age >= min_age))
}

fn document_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(list_dir(dir)?
        .into_iter()
        .filter(|path| {
            !is_temp_file(path)
                && path.extension().and_then(std::ffi::OsStr::to_str) == Some(DOCUMENT_EXTENSION)
        })
        .collect())
}

fn is_temp_file(path: &Path) -> bool {
    path.file_name()
        .and_then(std::ffi::OsStr::to_str)
        .is_some_and(|name| name.ends_with(&format!(".{TEMP_EXTENSION}")))
}

fn list_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let io_err = |e| PersistenceError::Io {
        operation: "read",
        path: dir.to_path_buf(),
        source: e,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        paths.push(entry.map_err(io_err)?.path());
    }
    Ok(paths)
}
