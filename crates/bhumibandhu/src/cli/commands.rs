//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::units::UnitKey;

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Maximum number of records
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Search command arguments.
#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Matched against land id, survey number, owner and village
    pub query: String,

    /// Maximum number of results
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Land id of the record
    pub land_id: String,

    /// Output the full record as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// JSON file holding one land record
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Map command arguments.
#[derive(Debug, Args)]
pub struct MapCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Convert command arguments.
#[derive(Debug, Args)]
pub struct ConvertCommand {
    /// Area to convert
    #[arg(allow_negative_numbers = true)]
    pub value: f64,

    /// Unit of the value (see `bhumi units`)
    #[arg(value_parser = parse_unit_key)]
    pub unit: UnitKey,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Land id of the record
    pub land_id: String,

    /// Directory to write into (defaults to the download directory)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

/// Document fetch arguments.
#[derive(Debug, Args)]
pub struct FetchDocCommand {
    /// Land id of the record
    pub land_id: String,

    /// Document name as listed by `bhumi show`
    pub name: String,

    /// Directory to write into (defaults to the download directory)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Parse a unit identifier, listing the valid ones on failure.
fn parse_unit_key(s: &str) -> Result<UnitKey, String> {
    s.parse().map_err(|_| {
        let known: Vec<_> = UnitKey::ALL.iter().map(|k| k.as_str()).collect();
        format!("unknown unit '{s}' (expected one of: {})", known.join(", "))
    })
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}
