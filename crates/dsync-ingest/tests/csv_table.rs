//! Integration tests for CSV parsing through the public entry point.

use dsync_ingest::{ParseError, ParserConfig, TabularFormat, parse_table};
use dsync_model::CellValue;
use proptest::prelude::*;

#[test]
fn parses_people_csv() {
    let table = parse_table(
        b"name,age\nAda,30\nLin,25\n",
        TabularFormat::Csv,
        &ParserConfig::default(),
    )
    .expect("parse csv");

    assert_eq!(table.headers, vec!["name", "age"]);
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.rows[0].get("name"), Some(&CellValue::text("Ada")));
    assert_eq!(table.rows[0].get("age"), Some(&CellValue::Number(30.0)));
    assert_eq!(table.rows[1].get("name"), Some(&CellValue::text("Lin")));
}

#[test]
fn header_only_csv_is_empty_dataset() {
    let result = parse_table(b"a,b\n", TabularFormat::Csv, &ParserConfig::default());
    assert!(matches!(
        result,
        Err(ParseError::EmptyDataset {
            headers: 2,
            rows: 0
        })
    ));
}

#[test]
fn blank_file_is_empty_dataset() {
    let result = parse_table(b"\n\n", TabularFormat::Csv, &ParserConfig::default());
    assert!(matches!(result, Err(ParseError::EmptyDataset { .. })));
}

#[test]
fn duplicate_headers_stay_addressable() {
    let table = parse_table(
        b"id,id,\n1,2,3\n",
        TabularFormat::Csv,
        &ParserConfig::default(),
    )
    .expect("parse csv");

    assert_eq!(table.headers, vec!["id", "id_1", "column_3"]);
    let row = &table.rows[0];
    assert_eq!(row.get("id"), Some(&CellValue::Number(1.0)));
    assert_eq!(row.get("id_1"), Some(&CellValue::Number(2.0)));
    assert_eq!(row.get("column_3"), Some(&CellValue::Number(3.0)));
}

#[test]
fn mixed_types_inferred_per_cell() {
    let table = parse_table(
        b"v\n1\ntrue\nabc\n\n2.5\n",
        TabularFormat::Csv,
        &ParserConfig::default(),
    )
    .expect("parse csv");

    let values: Vec<_> = table
        .rows
        .iter()
        .map(|r| r.get("v").cloned().unwrap())
        .collect();
    assert_eq!(
        values,
        vec![
            CellValue::Number(1.0),
            CellValue::Bool(true),
            CellValue::text("abc"),
            CellValue::Number(2.5),
        ]
    );
}

fn csv_line(fields: &[String]) -> String {
    fields.join(",")
}

proptest! {
    #[test]
    fn row_and_key_counts_match_source(
        (headers, rows) in (1usize..6).prop_flat_map(|width| {
            (
                proptest::collection::hash_set("[a-z][a-z0-9]{0,6}", width)
                    .prop_map(|set| set.into_iter().collect::<Vec<_>>()),
                proptest::collection::vec(
                    proptest::collection::vec("[A-Za-z0-9]{1,8}", width),
                    0..20,
                ),
            )
        })
    ) {
        let mut input = csv_line(&headers);
        input.push('\n');
        for row in &rows {
            input.push_str(&csv_line(row));
            input.push('\n');
        }

        let result = parse_table(input.as_bytes(), TabularFormat::Csv, &ParserConfig::default());

        if rows.is_empty() {
            let is_empty_err = matches!(result, Err(ParseError::EmptyDataset { .. }));
            prop_assert!(is_empty_err);
        } else {
            let table = result.expect("parse generated csv");
            prop_assert_eq!(&table.headers, &headers);
            prop_assert_eq!(table.rows.len(), rows.len());
            for row in &table.rows {
                prop_assert_eq!(row.len(), headers.len());
                prop_assert!(row.covers(&headers));
            }
        }
    }
}
