//! Error types for remote sheet fetching.

use thiserror::Error;

/// Errors that can occur while fetching a remote sheet.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    /// The share URL carries no spreadsheet identifier.
    #[error("no spreadsheet id in URL: {url}")]
    InvalidSheetUrl {
        /// The URL as given.
        url: String,
    },

    /// The export endpoint answered with a non-success status.
    #[error("export request failed with HTTP {status}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
    },

    /// The request did not complete within the client timeout.
    #[error("export request timed out")]
    Timeout,

    /// The export body is larger than the configured cap.
    #[error("export body exceeds {max_size} bytes")]
    TooLarge {
        /// Cap in bytes.
        max_size: u64,
    },

    /// Connection, TLS or body transfer failure.
    #[error("network error: {0}")]
    Network(String),

    /// The HTTP client could not be built.
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    /// Returns a user-friendly error message suitable for display.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::InvalidSheetUrl { .. } => {
                "The link does not look like a spreadsheet share URL."
            }
            Self::HttpStatus { status } if *status == 401 || *status == 403 => {
                "The spreadsheet is not shared publicly."
            }
            Self::HttpStatus { status } if *status == 404 => "The spreadsheet could not be found.",
            Self::HttpStatus { .. } => "The spreadsheet service returned an error.",
            Self::Timeout => "The spreadsheet took too long to respond.",
            Self::TooLarge { .. } => "The spreadsheet export is too large to import.",
            Self::Network(_) => {
                "Could not reach the spreadsheet service. Please check your internet connection."
            }
            Self::Client(_) => "An unexpected error occurred.",
        }
    }

    /// Returns whether a later retry might succeed.
    ///
    /// Nothing in this crate retries; the flag is for callers.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Network(_) => true,
            Self::HttpStatus { status } => *status == 429 || *status >= 500,
            Self::InvalidSheetUrl { .. } | Self::TooLarge { .. } | Self::Client(_) => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::HttpStatus {
                status: status.as_u16(),
            }
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;
