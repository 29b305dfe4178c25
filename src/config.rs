//! Configuration types for jrxml-scanner
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation

use crate::admission::DEFAULT_MAX_IN_FLIGHT;
use crate::error::ConfigError;
use crate::tables::TableKind;
use clap::Parser;
use std::path::PathBuf;

/// Maximum reasonable admission ceiling
const MAX_CEILING: usize = 10_000;

/// Scans a tree of report definitions into relational CSV tables
#[derive(Parser, Debug, Clone)]
#[command(
    name = "jrxml-scanner",
    version,
    about = "Scans a tree of JasperReports definitions into relational CSV tables",
    long_about = "Recursively scans a directory for report definition files and extracts\n\
                  parameters, fields, variables, query strings, and embedded sub-report\n\
                  references into normalized CSV tables.\n\n\
                  Concurrent file reads are capped to avoid exhausting file handles on\n\
                  trees with many thousands of reports.",
    after_help = "EXAMPLES:\n    \
        jrxml-scanner ./Reports\n    \
        jrxml-scanner ./Reports -o ./tables --stable-ids\n    \
        jrxml-scanner ./Reports --max-reads 50 --tables subreports,parameters\n    \
        jrxml-scanner ./Reports -e jrxml -q"
)]
pub struct CliArgs {
    /// Directory containing report definition files (scanned recursively)
    #[arg(value_name = "REPORT_DIR")]
    pub root: PathBuf,

    /// Output directory for the CSV tables
    #[arg(short, long, default_value = "report-tables", value_name = "DIR")]
    pub output: PathBuf,

    /// Report file extension to match (without the dot)
    #[arg(short = 'e', long, default_value = "jrxml", value_name = "EXT")]
    pub extension: String,

    /// Maximum concurrent file reads
    #[arg(long = "max-reads", default_value_t = DEFAULT_MAX_IN_FLIGHT, value_name = "NUM")]
    pub max_reads: usize,

    /// Only export the named tables (comma separated)
    #[arg(long, value_name = "TABLE", value_delimiter = ',')]
    pub tables: Vec<TableKind>,

    /// Renumber child-table ids by file after the scan for byte-stable
    /// output across runs
    #[arg(long)]
    pub stable_ids: bool,

    /// Quiet mode - suppress progress output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (show per-file debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Root directory to scan
    pub root_dir: PathBuf,

    /// Extension filter, stored without the leading dot
    pub extension: String,

    /// Admission ceiling for concurrent reads
    pub max_in_flight: usize,

    /// Directory receiving one CSV per table
    pub output_dir: PathBuf,

    /// Export filter; None exports every table
    pub table_selection: Option<Vec<TableKind>>,

    /// Renumber child tables for deterministic output
    pub stable_ids: bool,

    /// Show progress indicator
    pub show_progress: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl ScanConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        if !args.root.is_dir() {
            return Err(ConfigError::InvalidRootDir {
                path: args.root,
                reason: "not an existing directory".to_string(),
            });
        }

        if args.max_reads == 0 || args.max_reads > MAX_CEILING {
            return Err(ConfigError::InvalidCeiling {
                ceiling: args.max_reads,
                max: MAX_CEILING,
            });
        }

        let extension = args.extension.trim_start_matches('.').to_string();
        if extension.is_empty() {
            return Err(ConfigError::InvalidExtension {
                extension: args.extension,
                reason: "empty after stripping the leading dot".to_string(),
            });
        }
        if extension.contains(std::path::MAIN_SEPARATOR) {
            return Err(ConfigError::InvalidExtension {
                extension: args.extension,
                reason: "must not contain a path separator".to_string(),
            });
        }

        if args.output.is_file() {
            return Err(ConfigError::InvalidOutputDir {
                path: args.output,
                reason: "exists and is a file".to_string(),
            });
        }

        let table_selection = if args.tables.is_empty() {
            None
        } else {
            Some(args.tables)
        };

        Ok(Self {
            root_dir: args.root,
            extension,
            max_in_flight: args.max_reads,
            output_dir: args.output,
            table_selection,
            stable_ids: args.stable_ids,
            show_progress: !args.quiet,
            verbose: args.verbose,
        })
    }
}
