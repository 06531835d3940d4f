//! CLI argument definitions for `dsync`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "dsync",
    version,
    about = "Ingest CSV/XLSX files and Google Sheets into per-user datasets",
    long_about = "Ingest uploaded CSV/XLSX files and shared Google Sheets into \
                  per-user tabular datasets.\n\n\
                  Imported sheets can be re-synced on demand; each resync reports \
                  how the row count, headers and content changed."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Identity of the calling user. Datasets of other owners are invisible.
    #[arg(long = "owner", value_name = "ID", default_value = "local", global = true)]
    pub owner: String,

    /// Settings file (default: platform config dir).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Dataset store directory (overrides the settings file).
    #[arg(long = "store", value_name = "DIR", global = true)]
    pub store: Option<PathBuf>,

    /// Print results as JSON instead of tables.
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Upload a CSV or XLSX file as a new dataset.
    Upload {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List your datasets, newest first.
    List,

    /// Show a dataset and its first rows.
    Show {
        #[arg(value_name = "ID")]
        id: String,

        /// Number of rows to print.
        #[arg(long = "rows", value_name = "N", default_value_t = 10)]
        rows: usize,
    },

    /// Delete a dataset.
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Import a publicly shared Google Sheet, or refresh an earlier import.
    Import {
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Re-fetch an imported sheet and report what changed.
    Resync {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Per-column profile of a dataset.
    Summary {
        #[arg(value_name = "ID")]
        id: String,
    },
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "dsync", "show", "abc", "--rows", "3", "--owner", "ada", "--json",
        ])
        .unwrap();
        assert_eq!(cli.owner, "ada");
        assert!(cli.json);
        match cli.command {
            Command::Show { id, rows } => {
                assert_eq!(id, "abc");
                assert_eq!(rows, 3);
            }
            _ => panic!("expected show"),
        }
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["dsync", "list"]).unwrap();
        assert_eq!(cli.owner, "local");
        assert!(!cli.json);
        assert!(cli.store.is_none());
        assert!(cli.log_level.is_none());
        assert!(matches!(cli.log_format, LogFormatArg::Pretty));
    }

    #[test]
    fn test_upload_requires_file() {
        assert!(Cli::try_parse_from(["dsync", "upload"]).is_err());
    }
}
