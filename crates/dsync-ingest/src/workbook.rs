//! Workbook (`.xlsx` / `.xls`) parsing.
//!
//! Only the first worksheet is read and its first row is the header row.
//! Cells keep the type the workbook itself encodes; no text is re-parsed.

use std::io::Cursor;

use calamine::{Data, Range, Reader, Xls, Xlsx};
use dsync_model::{CellValue, Row, TableContent};

use crate::config::{HeaderRow, ParserConfig, SheetSelector};
use crate::error::{ParseError, Result};
use crate::format::TabularFormat;
use crate::header::normalize_headers;

/// Parses workbook bytes into normalized table content.
///
/// Missing cells become empty text. Rows whose cells are all blank are
/// skipped when `config.skip_blank_rows` is set.
pub fn parse_workbook(
    bytes: &[u8],
    format: TabularFormat,
    config: &ParserConfig,
) -> Result<TableContent> {
    let index = match config.sheet {
        SheetSelector::First => 0,
    };

    let range = match format {
        TabularFormat::Xlsx => read_sheet::<Xlsx<_>>(bytes, format, index)?,
        TabularFormat::Xls => read_sheet::<Xls<_>>(bytes, format, index)?,
        TabularFormat::Csv => {
            return Err(ParseError::Workbook {
                format,
                message: "CSV input is not a workbook".to_string(),
            });
        }
    };

    Ok(range_to_table(&range, config))
}

fn read_sheet<'a, R>(
    bytes: &'a [u8],
    format: TabularFormat,
    index: usize,
) -> Result<Range<Data>>
where
    R: Reader<Cursor<&'a [u8]>>,
    R::Error: std::fmt::Display,
{
    let mut workbook = R::new(Cursor::new(bytes)).map_err(|e| ParseError::Workbook {
        format,
        message: e.to_string(),
    })?;

    workbook
        .worksheet_range_at(index)
        .ok_or(ParseError::NoWorksheet { format })?
        .map_err(|e| ParseError::Workbook {
            format,
            message: e.to_string(),
        })
}

fn range_to_table(range: &Range<Data>, config: &ParserConfig) -> TableContent {
    let mut rows_iter = range.rows();

    let header_cells = match config.header_row {
        HeaderRow::First => rows_iter.next(),
    };
    let Some(header_cells) = header_cells else {
        return TableContent::default();
    };
    let headers = normalize_headers(header_cells.iter().map(header_text));

    let filler = CellValue::Text(String::new());
    let rows = rows_iter
        .filter(|cells| !(config.skip_blank_rows && cells.iter().all(is_blank)))
        .map(|cells| Row::from_cells(&headers, cells.iter().map(convert_cell), &filler))
        .collect();

    TableContent::new(headers, rows)
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => convert_cell(other).to_string(),
    }
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Text(String::new()),
        Data::Bool(v) => CellValue::Bool(*v),
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Float(v) => CellValue::Number(*v),
        Data::String(v) => CellValue::Text(v.clone()),
        // Date cells keep their serial number, as the workbook stores them
        Data::DateTime(v) => CellValue::Number(v.as_f64()),
        Data::DateTimeIso(v) | Data::DurationIso(v) => CellValue::Text(v.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}
