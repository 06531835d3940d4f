//! Integration tests for workbook parsing using generated `.xlsx` fixtures.

use dsync_ingest::{ParseError, ParserConfig, TabularFormat, parse_table};
use dsync_model::CellValue;
use rust_xlsxwriter::Workbook;

fn people_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name("People").unwrap();
    sheet.write_string(0, 0, "name").unwrap();
    sheet.write_string(0, 1, "age").unwrap();
    sheet.write_string(0, 2, "member").unwrap();
    sheet.write_string(1, 0, "Ada").unwrap();
    sheet.write_number(1, 1, 30).unwrap();
    sheet.write_boolean(1, 2, true).unwrap();
    // Row 2 left blank on purpose
    sheet.write_string(3, 0, "Lin").unwrap();
    sheet.write_string(3, 1, "25").unwrap();

    let other = workbook.add_worksheet();
    other.set_name("Ignored").unwrap();
    other.write_string(0, 0, "other").unwrap();
    other.write_string(1, 0, "value").unwrap();

    workbook.save_to_buffer().unwrap()
}

#[test]
fn reads_first_sheet_only() {
    let table = parse_table(&people_workbook(), TabularFormat::Xlsx, &ParserConfig::default())
        .expect("parse xlsx");

    assert_eq!(table.headers, vec!["name", "age", "member"]);
    assert!(!table.headers.contains(&"other".to_string()));
}

#[test]
fn keeps_native_cell_types_and_skips_blank_rows() {
    let table = parse_table(&people_workbook(), TabularFormat::Xlsx, &ParserConfig::default())
        .expect("parse xlsx");

    assert_eq!(table.row_count(), 2);

    let ada = &table.rows[0];
    assert_eq!(ada.get("name"), Some(&CellValue::text("Ada")));
    assert_eq!(ada.get("age"), Some(&CellValue::Number(30.0)));
    assert_eq!(ada.get("member"), Some(&CellValue::Bool(true)));

    // Text stays text: no inference on workbook cells
    let lin = &table.rows[1];
    assert_eq!(lin.get("age"), Some(&CellValue::text("25")));
    // Missing cell defaults to empty text
    assert_eq!(lin.get("member"), Some(&CellValue::text("")));
}

#[test]
fn header_only_sheet_is_empty_dataset() {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "only").unwrap();
    sheet.write_string(0, 1, "headers").unwrap();
    let bytes = workbook.save_to_buffer().unwrap();

    let result = parse_table(&bytes, TabularFormat::Xlsx, &ParserConfig::default());
    assert!(matches!(result, Err(ParseError::EmptyDataset { rows: 0, .. })));
}
