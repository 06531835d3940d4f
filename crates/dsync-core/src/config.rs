//! Service configuration.

use std::time::Duration;

use dsync_ingest::ParserConfig;
use dsync_remote::{DEFAULT_EXPORT_URL_TEMPLATE, DEFAULT_MAX_EXPORT_BYTES, FetcherConfig};
use serde::{Deserialize, Serialize};

/// Default per-file upload cap (5 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Limits and timeouts shared by the ingestion and sync services.
///
/// Every field has a default, so a partial TOML `[hub]` table is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Uploads larger than this are rejected before parsing.
    pub max_upload_bytes: u64,
    /// Remote exports larger than this are cut off while downloading.
    pub max_export_bytes: u64,
    /// Bound on one remote export fetch.
    pub fetch_timeout_secs: u64,
    /// Bound on parsing one file or export.
    pub parse_timeout_secs: u64,
    /// How long a cached column summary stays valid.
    pub summary_cache_ttl_secs: u64,
    /// Number of cached summaries; `0` disables the cache.
    pub summary_cache_capacity: usize,
    /// CSV export endpoint with an `{id}` placeholder.
    pub export_url_template: String,
    pub parser: ParserConfig,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_export_bytes: DEFAULT_MAX_EXPORT_BYTES,
            fetch_timeout_secs: 30,
            parse_timeout_secs: 30,
            summary_cache_ttl_secs: 300,
            summary_cache_capacity: 128,
            export_url_template: DEFAULT_EXPORT_URL_TEMPLATE.to_string(),
            parser: ParserConfig::default(),
        }
    }
}

impl HubConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn parse_timeout(&self) -> Duration {
        Duration::from_secs(self.parse_timeout_secs)
    }

    pub fn summary_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.summary_cache_ttl_secs)
    }

    /// Settings for the HTTP sheet fetcher.
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            export_url_template: self.export_url_template.clone(),
            timeout: self.fetch_timeout(),
            max_bytes: self.max_export_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HubConfig::default();
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.max_export_bytes, 20 * 1024 * 1024);
        assert_eq!(config.fetcher_config().max_bytes, config.max_export_bytes);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(30));
        assert_eq!(config.parse_timeout(), Duration::from_secs(30));
        assert_eq!(config.summary_cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.summary_cache_capacity, 128);
        assert!(config.export_url_template.contains("{id}"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: HubConfig = toml::from_str(
            r#"
            max_upload_bytes = 1024
            [parser]
            infer_types = false
            "#,
        )
        .unwrap();
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(config.fetch_timeout_secs, 30);
        assert!(!config.parser.infer_types);
        assert!(config.parser.skip_blank_rows);
    }
}
