//! Share URL handling.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{FetchError, Result};

/// Default CSV export endpoint. `{id}` is replaced by the spreadsheet id.
pub const DEFAULT_EXPORT_URL_TEMPLATE: &str =
    "https://docs.google.com/spreadsheets/d/{id}/export?format=csv";

static SHEET_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/d/([A-Za-z0-9_-]+)").expect("Invalid sheet id regex"));

/// Extracts the spreadsheet identifier from a share URL of the form
/// `.../d/<id>/...`.
pub fn extract_sheet_id(share_url: &str) -> Result<&str> {
    SHEET_ID_REGEX
        .captures(share_url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| FetchError::InvalidSheetUrl {
            url: share_url.to_string(),
        })
}

/// Builds the export URL by substituting `id` into `template`.
pub fn export_url(template: &str, id: &str) -> String {
    template.replace("{id}", id)
}
