//! Parsing off the async runtime, under a deadline.

use std::time::Duration;

use dsync_ingest::{ParserConfig, TabularFormat, parse_table};
use dsync_model::TableContent;

use crate::error::{DatasetError, Result};

/// Parses `bytes` on the blocking pool, giving up after `limit`.
///
/// A timed-out parse is abandoned; its result is discarded whenever it
/// finishes, so nothing downstream ever sees it.
pub(crate) async fn parse_bounded(
    bytes: Vec<u8>,
    format: TabularFormat,
    config: ParserConfig,
    limit: Duration,
) -> Result<TableContent> {
    let task = tokio::task::spawn_blocking(move || parse_table(&bytes, format, &config));

    match tokio::time::timeout(limit, task).await {
        Ok(Ok(parsed)) => Ok(parsed?),
        Ok(Err(join_error)) => Err(DatasetError::Task(join_error)),
        Err(_) => {
            tracing::warn!(format = %format, limit_secs = limit.as_secs(), "Parse timed out");
            Err(DatasetError::ParseTimeout {
                seconds: limit.as_secs(),
            })
        }
    }
}
