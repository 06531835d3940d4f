//! Table and JSON rendering of command results.

use chrono::{DateTime, Utc};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use dsync_core::DatasetError;
use dsync_model::{
    CellValue, ChangeSummary, ChangeType, Dataset, DatasetId, DatasetOverview, DatasetSummary,
    ImportResult, IngestResult, Row, SyncResult,
};
use serde::Serialize;

/// Longest sheet URL or sample shown in a table cell.
const MAX_CELL_CHARS: usize = 48;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_ingested(result: &IngestResult) {
    println!("Created dataset {}", result.dataset_id);
    let mut table = Table::new();
    table.set_header(vec![header_cell("Rows"), header_cell("Columns")]);
    apply_table_style(&mut table);
    table.add_row(vec![
        Cell::new(result.row_count),
        Cell::new(result.headers.join(", ")),
    ]);
    align_column(&mut table, 0, CellAlignment::Right);
    println!("{table}");
}

pub fn print_overviews(datasets: &[DatasetOverview]) {
    if datasets.is_empty() {
        println!("No datasets.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Source"),
        header_cell("Name"),
        header_cell("Rows"),
        header_cell("Cols"),
        header_cell("Last synced"),
        header_cell("Syncs"),
    ]);
    apply_table_style(&mut table);

    for dataset in datasets {
        let name = dataset
            .file_name
            .as_deref()
            .or(dataset.sheet_url.as_deref())
            .unwrap_or("-");
        table.add_row(vec![
            Cell::new(dataset.id),
            Cell::new(dataset.source),
            Cell::new(truncate(name)),
            Cell::new(dataset.row_count),
            Cell::new(dataset.headers.len()),
            dim_cell(timestamp(dataset.last_synced_at)),
            sync_count_cell(dataset.sync_count),
        ]);
    }
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 6, CellAlignment::Right);
    println!("{table}");
}

/// Dataset metadata followed by its first `rows` rows.
pub fn print_dataset(dataset: &Dataset, rows: usize) {
    let overview = dataset.overview();
    let mut meta = Table::new();
    apply_table_style(&mut meta);
    meta.add_row(vec![header_cell("ID"), Cell::new(overview.id)]);
    meta.add_row(vec![header_cell("Source"), Cell::new(overview.source)]);
    if let Some(name) = &overview.file_name {
        meta.add_row(vec![header_cell("File"), Cell::new(name)]);
    }
    if let Some(url) = &overview.sheet_url {
        meta.add_row(vec![header_cell("Sheet"), Cell::new(url)]);
    }
    meta.add_row(vec![header_cell("Rows"), Cell::new(overview.row_count)]);
    meta.add_row(vec![
        header_cell("Uploaded"),
        Cell::new(timestamp(overview.uploaded_at)),
    ]);
    meta.add_row(vec![
        header_cell("Last synced"),
        Cell::new(timestamp(overview.last_synced_at)),
    ]);
    if let Some(count) = overview.sync_count {
        meta.add_row(vec![header_cell("Syncs"), Cell::new(count)]);
    }
    println!("{meta}");

    let sample = dataset.sample_rows(rows);
    if sample.is_empty() {
        return;
    }
    println!("{}", rows_table(dataset.headers(), sample));
    if sample.len() < dataset.row_count() {
        println!(
            "{} of {} rows shown",
            sample.len(),
            dataset.row_count()
        );
    }
}

pub fn print_deleted(id: DatasetId) {
    println!("Deleted dataset {id}");
}

pub fn print_imported(result: &ImportResult) {
    match &result.changes {
        None => println!("Imported sheet as dataset {}", result.dataset_id),
        Some(changes) => {
            println!("Sheet already imported as {}; refreshed", result.dataset_id);
            print_changes(changes, result.sync_count);
        }
    }
    println!(
        "{} rows, columns: {}",
        result.row_count,
        result.headers.join(", ")
    );
}

pub fn print_synced(result: &SyncResult) {
    println!("Synced dataset {}", result.dataset_id);
    print_changes(&result.changes, result.sync_count);
}

pub fn print_summary(summary: &DatasetSummary) {
    println!("{} rows", summary.row_count);
    if summary.columns.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Kind"),
        header_cell("Non-empty"),
        header_cell("Distinct"),
        header_cell("Sample"),
    ]);
    apply_table_style(&mut table);
    for column in &summary.columns {
        let sample = column
            .sample
            .iter()
            .map(CellValue::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(&column.name).add_attribute(Attribute::Bold),
            Cell::new(column.kind.label()),
            Cell::new(column.non_empty),
            Cell::new(column.distinct),
            dim_cell(truncate(&sample)),
        ]);
    }
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    println!("{table}");
}

/// Error line plus an optional hint, written to stderr.
pub fn print_error(error: &anyhow::Error) {
    match error.downcast_ref::<DatasetError>() {
        Some(dataset_error) => {
            eprintln!(
                "error[{}]: {}",
                dataset_error.kind(),
                dataset_error.user_message()
            );
            if let Some(suggestion) = dataset_error.suggestion() {
                eprintln!("hint: {suggestion}");
            }
        }
        None => eprintln!("error: {error:#}"),
    }
}

/// JSON body describing a failure, for `--json` callers.
pub fn error_json(error: &anyhow::Error) -> serde_json::Value {
    match error.downcast_ref::<DatasetError>() {
        Some(dataset_error) => serde_json::json!({
            "error": {
                "kind": dataset_error.kind(),
                "message": dataset_error.user_message(),
                "suggestion": dataset_error.suggestion(),
            }
        }),
        None => serde_json::json!({
            "error": {
                "kind": "cli",
                "message": format!("{error:#}"),
            }
        }),
    }
}

fn print_changes(changes: &ChangeSummary, sync_count: u32) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Change"),
        header_cell("Rows before"),
        header_cell("Rows after"),
        header_cell("Delta"),
        header_cell("Headers"),
        header_cell("Content"),
        header_cell("Syncs"),
    ]);
    apply_table_style(&mut table);
    table.add_row(vec![
        change_cell(changes.change_type),
        Cell::new(changes.previous_row_count),
        Cell::new(changes.current_row_count),
        Cell::new(format!("{:+}", changes.rows_changed)),
        changed_cell(changes.headers_changed),
        changed_cell(changes.content_changed),
        Cell::new(sync_count),
    ]);
    for index in [1, 2, 3, 6] {
        align_column(&mut table, index, CellAlignment::Right);
    }
    println!("{table}");
}

fn rows_table(headers: &[String], rows: &[Row]) -> Table {
    let mut table = Table::new();
    table.set_header(headers.iter().map(|h| header_cell(h)).collect::<Vec<_>>());
    apply_table_style(&mut table);
    for row in rows {
        table.add_row(
            row.values_in(headers)
                .map(|value| match value {
                    CellValue::Empty => dim_cell("-"),
                    other => Cell::new(truncate(&other.to_string())),
                })
                .collect::<Vec<_>>(),
        );
    }
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn change_cell(change: ChangeType) -> Cell {
    let color = match change {
        ChangeType::Added => Color::Green,
        ChangeType::Removed => Color::Red,
        ChangeType::NoChange => Color::DarkGrey,
    };
    Cell::new(change.label()).fg(color)
}

fn changed_cell(changed: bool) -> Cell {
    if changed {
        Cell::new("changed").fg(Color::Yellow)
    } else {
        dim_cell("same")
    }
}

fn sync_count_cell(count: Option<u32>) -> Cell {
    match count {
        Some(count) => Cell::new(count),
        None => dim_cell("-"),
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn truncate(value: &str) -> String {
    if value.chars().count() <= MAX_CELL_CHARS {
        return value.to_string();
    }
    let mut short: String = value.chars().take(MAX_CELL_CHARS - 3).collect();
    short.push_str("...");
    short
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short"), "short");
        let long = "x".repeat(100);
        let short = truncate(&long);
        assert_eq!(short.chars().count(), MAX_CELL_CHARS);
        assert!(short.ends_with("..."));
    }

    #[test]
    fn test_error_json_carries_kind_code() {
        let error = anyhow::Error::new(DatasetError::NotFound);
        let body = error_json(&error);
        assert_eq!(body["error"]["kind"], "not_found");
        assert_eq!(body["error"]["message"], DatasetError::NotFound.user_message());
    }

    #[test]
    fn test_error_json_for_cli_failures() {
        let error = anyhow::anyhow!("failed to read upload.csv");
        let body = error_json(&error);
        assert_eq!(body["error"]["kind"], "cli");
        assert_eq!(body["error"]["message"], "failed to read upload.csv");
    }
}
