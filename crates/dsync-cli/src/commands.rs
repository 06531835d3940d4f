//! Subcommand execution against a file-backed hub.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use dsync_core::{DatasetHub, resolve_dataset_id};
use dsync_model::{DatasetOverview, OwnerId, Row};
use dsync_persistence::JsonFileStore;
use dsync_remote::HttpSheetFetcher;
use serde::Serialize;

use dsync_cli::settings::Settings;

use crate::cli::{Cli, Command};
use crate::render;

type Hub = DatasetHub<JsonFileStore, HttpSheetFetcher>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ShownDataset<'a> {
    #[serde(flatten)]
    overview: DatasetOverview,
    rows: &'a [Row],
}

/// Builds the hub described by the settings and the CLI flags.
fn build_hub(settings: &Settings, store_flag: Option<&Path>) -> Result<Hub> {
    let store_dir = settings.store_dir(store_flag);
    let store = JsonFileStore::open(&store_dir)
        .with_context(|| format!("failed to open dataset store at {}", store_dir.display()))?;
    let fetcher = HttpSheetFetcher::new(settings.hub.fetcher_config())
        .context("failed to build HTTP client")?;
    Ok(DatasetHub::new(
        Arc::new(store),
        Arc::new(fetcher),
        settings.hub.clone(),
    ))
}

pub async fn run(cli: &Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    let hub = build_hub(&settings, cli.store.as_deref())?;
    let owner = OwnerId::new(cli.owner.as_str());

    match &cli.command {
        Command::Upload { file } => {
            let file_name = file
                .file_name()
                .and_then(std::ffi::OsStr::to_str)
                .with_context(|| format!("not a file path: {}", file.display()))?;
            let size = tokio::fs::metadata(file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?
                .len();
            hub.check_upload(file_name, size)?;
            let bytes = tokio::fs::read(file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let result = hub.upload(&owner, &bytes, file_name).await?;
            if cli.json {
                render::print_json(&result)?;
            } else {
                render::print_ingested(&result);
            }
        }
        Command::List => {
            let datasets = hub.list(&owner).await?;
            if cli.json {
                render::print_json(&datasets)?;
            } else {
                render::print_overviews(&datasets);
            }
        }
        Command::Show { id, rows } => {
            let dataset = hub.get(&owner, resolve_dataset_id(id)?).await?;
            if cli.json {
                render::print_json(&ShownDataset {
                    overview: dataset.overview(),
                    rows: dataset.sample_rows(*rows),
                })?;
            } else {
                render::print_dataset(&dataset, *rows);
            }
        }
        Command::Delete { id } => {
            let id = resolve_dataset_id(id)?;
            hub.delete(&owner, id).await?;
            if cli.json {
                render::print_json(&serde_json::json!({ "deleted": id }))?;
            } else {
                render::print_deleted(id);
            }
        }
        Command::Import { url } => {
            let result = hub.import_from_url(&owner, url).await?;
            if cli.json {
                render::print_json(&result)?;
            } else {
                render::print_imported(&result);
            }
        }
        Command::Resync { id } => {
            let result = hub.resync(&owner, resolve_dataset_id(id)?).await?;
            if cli.json {
                render::print_json(&result)?;
            } else {
                render::print_synced(&result);
            }
        }
        Command::Summary { id } => {
            let summary = hub.summary(&owner, resolve_dataset_id(id)?).await?;
            if cli.json {
                render::print_json(summary.as_ref())?;
            } else {
                render::print_summary(&summary);
            }
        }
    }
    Ok(())
}
