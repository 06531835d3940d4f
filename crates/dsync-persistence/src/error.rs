//! Persistence error types.
//!
//! All store operations return structured errors that provide
//! user-friendly messages and optional remediation hints.

use std::path::PathBuf;
use thiserror::Error;

/// Persistence operation error.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Failed to serialize dataset document")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    /// Stored document could not be read back.
    #[error("Failed to deserialize dataset document: {path}")]
    Deserialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to complete save operation")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content with no headers or no rows was handed to the store.
    #[error("Refusing to store empty content ({headers} headers, {rows} rows)")]
    EmptyContent { headers: usize, rows: usize },

    /// Background storage task panicked or was cancelled.
    #[error("Storage task failed")]
    Task {
        #[source]
        source: tokio::task::JoinError,
    },
}

impl PersistenceError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => {
                format!("Could not {} the file at {}", operation, path.display())
            }
            Self::Serialization { .. } => {
                "An error occurred while saving the dataset.".to_string()
            }
            Self::Deserialization { path, .. } => {
                format!(
                    "The stored dataset at {} could not be read. The file may be corrupted.",
                    path.display()
                )
            }
            Self::AtomicWriteFailed { target_path, .. } => {
                format!(
                    "Could not save the file to {}. Please check disk space and permissions.",
                    target_path.display()
                )
            }
            Self::EmptyContent { .. } => "A dataset needs at least one column and one row.".to_string(),
            Self::Task { .. } => "An unexpected storage error occurred.".to_string(),
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Io { operation, .. } => {
                if *operation == "read" {
                    Some("Check that the store directory exists and you have permission to read it.".into())
                } else {
                    Some("Check that you have permission to write to the store directory.".into())
                }
            }
            Self::Deserialization { .. } => {
                Some("Delete the damaged dataset and import it again.".into())
            }
            Self::AtomicWriteFailed { .. } => {
                Some("Free up disk space or choose a different store directory.".into())
            }
            Self::Serialization { .. } | Self::EmptyContent { .. } | Self::Task { .. } => None,
        }
    }
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_suggestion_depends_on_operation() {
        let read = PersistenceError::Io {
            operation: "read",
            path: PathBuf::from("/tmp/x.json"),
            source: std::io::Error::other("boom"),
        };
        assert!(read.suggestion().unwrap().contains("read"));
        assert!(read.user_message().contains("/tmp/x.json"));

        let write = PersistenceError::Io {
            operation: "write",
            path: PathBuf::from("/tmp/x.json"),
            source: std::io::Error::other("boom"),
        };
        assert!(write.suggestion().unwrap().contains("write"));
    }

    #[test]
    fn test_empty_content_message() {
        let err = PersistenceError::EmptyContent {
            headers: 2,
            rows: 0,
        };
        assert!(err.to_string().contains("2 headers, 0 rows"));
        assert!(err.suggestion().is_none());
    }
}
