//! CSV reading: first record is the header row.

use dsync_model::{CellValue, Row, TableContent};

use crate::config::{HeaderRow, ParserConfig};
use crate::error::Result;
use crate::guard::validate_encoding;
use crate::header::normalize_headers;

use super::infer::infer_cell;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parses CSV bytes into normalized table content.
///
/// Records may be ragged: short records are padded with `Empty`, surplus
/// fields beyond the header row are dropped. Blank records are skipped when
/// `config.skip_blank_rows` is set. An input without any record yields an
/// empty table; the caller decides whether that is an error.
pub fn parse_csv(bytes: &[u8], config: &ParserConfig) -> Result<TableContent> {
    validate_encoding(bytes)?;
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut records = reader.records();

    let header_record = match config.header_row {
        HeaderRow::First => records.next().transpose()?,
    };
    let Some(header_record) = header_record else {
        return Ok(TableContent::default());
    };
    let headers = normalize_headers(header_record.iter());

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    let mut ragged = 0usize;

    for record in records {
        let record = record?;
        if config.skip_blank_rows && record.iter().all(|field| field.trim().is_empty()) {
            skipped += 1;
            continue;
        }
        if record.len() > headers.len() {
            ragged += 1;
        }

        let cells = record.iter().map(|field| {
            if config.infer_types {
                infer_cell(field)
            } else if field.is_empty() {
                CellValue::Empty
            } else {
                CellValue::text(field)
            }
        });
        rows.push(Row::from_cells(&headers, cells, &CellValue::Empty));
    }

    if skipped > 0 {
        tracing::debug!(records = skipped, "Skipped blank CSV records");
    }
    if ragged > 0 {
        tracing::warn!(
            records = ragged,
            columns = headers.len(),
            "CSV records had more fields than headers; extra fields dropped"
        );
    }

    Ok(TableContent::new(headers, rows))
}
