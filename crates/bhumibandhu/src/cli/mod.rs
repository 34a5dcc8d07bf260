//! Command-line interface for bhumibandhu.
//!
//! This module provides the CLI structure for the `bhumi` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ConfigCommand, ConvertCommand, ExportCommand, FetchDocCommand, ListCommand,
    MapCommand, OutputFormat, SearchCommand, ShowCommand, StatsCommand, StatusCommand,
};

/// bhumi - Land record registry
///
/// Browse, search and add land parcel records, convert areas between
/// regional units, and export records and their documents.
#[derive(Debug, Parser)]
#[command(name = "bhumi")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List records, newest first
    List(ListCommand),

    /// Search records
    Search(SearchCommand),

    /// Show one record in full
    Show(ShowCommand),

    /// Add a record from a JSON file
    Add(AddCommand),

    /// Show dashboard statistics and recent records
    Stats(StatsCommand),

    /// List records that carry coordinates
    Map(MapCommand),

    /// Convert an area into every other unit
    Convert(ConvertCommand),

    /// List the supported area units
    Units,

    /// Export a record to JSON
    Export(ExportCommand),

    /// Save a record's document locally
    FetchDoc(FetchDocCommand),

    /// Show storage status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                2 => crate::logging::Verbosity::Debug,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Verbosity;
    use crate::units::UnitKey;
    use clap::CommandFactory;

    fn cli_with(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Units,
        }
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "bhumi");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(cli_with(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli_with(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli_with(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli_with(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli_with(2, false).verbosity(), Verbosity::Debug);
        assert_eq!(cli_with(3, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_list_defaults() {
        let cli = Cli::try_parse_from(["bhumi", "list"]).unwrap();
        match cli.command {
            Command::List(cmd) => {
                assert_eq!(cmd.limit, None);
                assert_eq!(cmd.format, OutputFormat::Table);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_search() {
        let cli =
            Cli::try_parse_from(["bhumi", "search", "gn-45", "--limit", "3", "-f", "json"]).unwrap();
        match cli.command {
            Command::Search(cmd) => {
                assert_eq!(cmd.query, "gn-45");
                assert_eq!(cmd.limit, Some(3));
                assert_eq!(cmd.format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_convert() {
        let cli = Cli::try_parse_from(["bhumi", "convert", "2.5", "bigha_up"]).unwrap();
        match cli.command {
            Command::Convert(cmd) => {
                assert!((cmd.value - 2.5).abs() < f64::EPSILON);
                assert_eq!(cmd.unit, UnitKey::BighaUp);
                assert!(!cmd.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_convert_negative_value() {
        let cli = Cli::try_parse_from(["bhumi", "convert", "-4", "acres"]).unwrap();
        assert!(matches!(cli.command, Command::Convert(ref cmd) if cmd.value < 0.0));
    }

    #[test]
    fn test_parse_convert_unknown_unit() {
        assert!(Cli::try_parse_from(["bhumi", "convert", "1", "furlongs"]).is_err());
    }

    #[test]
    fn test_parse_fetch_doc() {
        let cli = Cli::try_parse_from([
            "bhumi",
            "fetch-doc",
            "ULP123456789012",
            "Sale Deed",
            "--output",
            "/tmp/docs",
        ])
        .unwrap();
        match cli.command {
            Command::FetchDoc(cmd) => {
                assert_eq!(cmd.land_id, "ULP123456789012");
                assert_eq!(cmd.name, "Sale Deed");
                assert_eq!(cmd.output, Some(PathBuf::from("/tmp/docs")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_config_validate() {
        let cli = Cli::try_parse_from(["bhumi", "config", "validate", "--file", "a.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = Cli::try_parse_from(["bhumi", "-c", "/custom/config.toml", "status"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert!(matches!(cli.command, Command::Status(_)));
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["bhumi", "stats", "-vv", "--json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Stats(StatsCommand { json: true })));
    }

    #[test]
    fn test_parse_with_quiet() {
        let cli = Cli::try_parse_from(["bhumi", "-q", "units"]).unwrap();
        assert!(cli.quiet);
    }
}
