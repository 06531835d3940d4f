//! HTTP client for spreadsheet CSV exports.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};

use crate::error::{FetchError, Result};
use crate::url::{DEFAULT_EXPORT_URL_TEMPLATE, export_url, extract_sheet_id};

/// Default cap on an export body (20 MiB).
pub const DEFAULT_MAX_EXPORT_BYTES: u64 = 20 * 1024 * 1024;

/// User agent string for export requests.
const USER_AGENT_VALUE: &str = concat!("dsync/", env!("CARGO_PKG_VERSION"));

/// Anything that can turn a share URL into raw CSV bytes.
///
/// Implementations perform a live fetch on every call.
pub trait SheetSource: Send + Sync {
    /// Fetches the CSV export for `share_url`.
    fn fetch_csv(&self, share_url: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Settings for [`HttpSheetFetcher`].
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Export endpoint with an `{id}` placeholder.
    pub export_url_template: String,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Largest export body accepted, in bytes.
    pub max_bytes: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            export_url_template: DEFAULT_EXPORT_URL_TEMPLATE.to_string(),
            timeout: Duration::from_secs(30),
            max_bytes: DEFAULT_MAX_EXPORT_BYTES,
        }
    }
}

/// Fetches CSV exports over HTTP with a single GET per call.
#[derive(Debug, Clone)]
pub struct HttpSheetFetcher {
    client: reqwest::Client,
    export_url_template: String,
    max_bytes: u64,
}

impl HttpSheetFetcher {
    /// Creates a fetcher from the given settings.
    pub fn new(config: FetcherConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/csv, */*;q=0.8"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            export_url_template: config.export_url_template,
            max_bytes: config.max_bytes,
        })
    }

    /// Returns the export URL a share URL resolves to.
    pub fn export_url_for(&self, share_url: &str) -> Result<String> {
        let id = extract_sheet_id(share_url)?;
        Ok(export_url(&self.export_url_template, id))
    }
}

impl SheetSource for HttpSheetFetcher {
    async fn fetch_csv(&self, share_url: &str) -> Result<Vec<u8>> {
        let url = self.export_url_for(share_url)?;

        tracing::debug!("Fetching sheet export from {}", url);

        let mut response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Sheet export request failed");
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let too_large = FetchError::TooLarge {
            max_size: self.max_bytes,
        };
        if response.content_length().is_some_and(|len| len > self.max_bytes) {
            tracing::warn!(max_bytes = self.max_bytes, "Sheet export declared too large");
            return Err(too_large);
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if (body.len() + chunk.len()) as u64 > self.max_bytes {
                tracing::warn!(max_bytes = self.max_bytes, "Sheet export exceeded size cap");
                return Err(too_large);
            }
            body.extend_from_slice(&chunk);
        }

        tracing::debug!(bytes = body.len(), "Fetched sheet export");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_url_for() {
        let fetcher = HttpSheetFetcher::new(FetcherConfig::default()).unwrap();
        assert_eq!(
            fetcher
                .export_url_for("https://docs.google.com/spreadsheets/d/abc/edit")
                .unwrap(),
            "https://docs.google.com/spreadsheets/d/abc/export?format=csv"
        );
    }

    #[test]
    fn test_export_url_for_invalid() {
        let fetcher = HttpSheetFetcher::new(FetcherConfig::default()).unwrap();
        assert!(matches!(
            fetcher.export_url_for("not a url"),
            Err(FetchError::InvalidSheetUrl { .. })
        ));
    }
}
