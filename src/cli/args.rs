//! Command-line argument definitions for the TAMIS processor
//!
//! Defines the CLI interface using the clap derive API and converts the
//! parsed arguments into a [`TamisConfig`].

use crate::config::{CompressionAlgorithm, OutputConfig, OutputFormat, TamisConfig};
use crate::constants::CENTRAL_STANDARD_TIME;
use crate::error::{Result, TamisError};
use crate::header::parse_delimiter_token;
use crate::models::DuplicatePolicy;
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the TAMIS report processor
///
/// Converts TCEQ TAMIS/GeoTAMIS raw-data reports into wide tables with one
/// row per timestamp and site and one column per parameter and unit.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tamis-processor",
    version,
    about = "Convert TCEQ TAMIS air-quality reports into wide, labelled CSV or Parquet tables",
    long_about = "Reads TAMIS/GeoTAMIS raw-data transaction reports, locates the column header and \
                  field delimiter in the report preamble, labels every measurement from the parameter, \
                  unit and site reference catalogs and pivots the result into a wide table keyed by \
                  timestamp and site."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Process TAMIS reports into wide tables (main command)
    Process(ProcessArgs),
    /// Build the structured reference catalogs from raw tab-delimited exports
    ConvertReferences(ConvertArgs),
}

/// Arguments for the process command
#[derive(Debug, Clone, Parser)]
pub struct ProcessArgs {
    /// Report files, directories or glob patterns
    ///
    /// Directories are searched recursively for `.txt` reports.
    #[arg(value_name = "REPORTS", required = true)]
    pub inputs: Vec<String>,

    /// Directory holding the parameter, unit and site catalogs
    ///
    /// Defaults to the platform data directory, e.g.
    /// ~/.local/share/tamis-processor/ref_files on Linux.
    #[arg(
        short = 'r',
        long = "reference-dir",
        value_name = "PATH",
        help = "Directory holding the reference catalogs"
    )]
    pub reference_dir: Option<PathBuf>,

    /// Time zone the report's wall-clock times are recorded in
    #[arg(
        long = "tz-in",
        value_name = "ZONE",
        default_value = CENTRAL_STANDARD_TIME,
        help = "IANA time zone of the report timestamps"
    )]
    pub tz_in: String,

    /// Time zone the output timestamps are converted to
    #[arg(
        long = "tz-out",
        value_name = "ZONE",
        default_value = CENTRAL_STANDARD_TIME,
        help = "IANA time zone of the output timestamps"
    )]
    pub tz_out: String,

    /// Keep timestamps naive instead of attaching time zones
    #[arg(
        long = "naive",
        help = "Keep timestamps naive (ignores --tz-in and --tz-out)"
    )]
    pub naive: bool,

    /// What to do when a site reports the same parameter twice for one timestamp
    #[arg(
        long = "duplicates",
        value_enum,
        default_value = "error",
        help = "Resolution of repeated observations"
    )]
    pub duplicates: DuplicateArg,

    /// Field delimiter override
    ///
    /// Accepts a single punctuation character or `Tab`. When given, the
    /// `Fields Delimited by:` preamble line is not required.
    #[arg(
        long = "delimiter",
        value_name = "TOKEN",
        value_parser = parse_delimiter_arg,
        help = "Force the field delimiter (e.g. ',', '|', Tab)"
    )]
    pub delimiter: Option<u8>,

    /// Earliest report wall-clock time to keep (inclusive)
    #[arg(
        long = "start",
        value_name = "DATETIME",
        value_parser = parse_datetime_arg,
        help = "Keep observations at or after this time (YYYY-MM-DD[ HH:MM[:SS]])"
    )]
    pub start: Option<NaiveDateTime>,

    /// Latest report wall-clock time to keep (inclusive)
    #[arg(
        long = "end",
        value_name = "DATETIME",
        value_parser = parse_datetime_arg,
        help = "Keep observations at or before this time (YYYY-MM-DD[ HH:MM[:SS]])"
    )]
    pub end: Option<NaiveDateTime>,

    /// Output file format
    #[arg(
        short = 'f',
        long = "format",
        value_enum,
        default_value = "csv",
        help = "Output file format"
    )]
    pub format: FormatArg,

    /// Parquet compression algorithm
    #[arg(
        long = "compression",
        value_enum,
        default_value = "snappy",
        help = "Parquet compression algorithm"
    )]
    pub compression: CompressionArg,

    /// Directory for the output tables
    ///
    /// Each table is named after its report. If not specified, tables are
    /// written beside their reports.
    #[arg(
        short = 'o',
        long = "output-dir",
        value_name = "PATH",
        help = "Directory for the output tables"
    )]
    pub output_dir: Option<PathBuf>,

    /// Process and summarize without writing any tables
    #[arg(long = "no-save", help = "Process reports without writing output files")]
    pub no_save: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Arguments for the convert-references command
#[derive(Debug, Clone, Parser)]
pub struct ConvertArgs {
    /// Directory holding the raw tab-delimited catalog exports
    #[arg(value_name = "RAW_DIR")]
    pub raw_dir: PathBuf,

    /// Directory to write the structured catalogs to
    ///
    /// Defaults to the platform data directory used by `process`.
    #[arg(
        short = 'o',
        long = "output-dir",
        value_name = "PATH",
        help = "Directory to write the structured catalogs to"
    )]
    pub output_dir: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DuplicateArg {
    /// Fail on the first repeated observation
    Error,
    /// Keep the first reported value
    First,
    /// Keep the last reported value
    Last,
    /// Average the repeated values
    Mean,
}

impl From<DuplicateArg> for DuplicatePolicy {
    fn from(arg: DuplicateArg) -> Self {
        match arg {
            DuplicateArg::Error => DuplicatePolicy::Error,
            DuplicateArg::First => DuplicatePolicy::First,
            DuplicateArg::Last => DuplicatePolicy::Last,
            DuplicateArg::Mean => DuplicatePolicy::Mean,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Csv,
    Parquet,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Parquet => OutputFormat::Parquet,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompressionArg {
    Snappy,
    Zstd,
    Lz4,
    Gzip,
    #[value(name = "none")]
    Uncompressed,
}

impl From<CompressionArg> for CompressionAlgorithm {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::Snappy => CompressionAlgorithm::Snappy,
            CompressionArg::Zstd => CompressionAlgorithm::Zstd,
            CompressionArg::Lz4 => CompressionAlgorithm::Lz4,
            CompressionArg::Gzip => CompressionAlgorithm::Gzip,
            CompressionArg::Uncompressed => CompressionAlgorithm::Uncompressed,
        }
    }
}

/// Parse a `--delimiter` value
pub fn parse_delimiter_arg(token: &str) -> std::result::Result<u8, String> {
    parse_delimiter_token(token).map_err(|e| e.to_string())
}

/// Parse a `--start`/`--end` value; a bare date means midnight
pub fn parse_datetime_arg(value: &str) -> std::result::Result<NaiveDateTime, String> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];

    let value = value.trim();
    for format in FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(datetime);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format!("Expected YYYY-MM-DD[ HH:MM[:SS]], got '{}'", value))
}

impl ProcessArgs {
    /// Validate the process command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if let Some(reference_dir) = &self.reference_dir {
            if !reference_dir.is_dir() {
                return Err(TamisError::Configuration {
                    message: format!(
                        "Reference directory does not exist: {}",
                        reference_dir.display()
                    ),
                });
            }
        }

        if let Some(output_dir) = &self.output_dir {
            if output_dir.is_file() {
                return Err(TamisError::Configuration {
                    message: format!("Output path is a file: {}", output_dir.display()),
                });
            }
        }

        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(TamisError::Configuration {
                    message: format!("--start {} is after --end {}", start, end),
                });
            }
        }

        Ok(())
    }

    /// Build the processing configuration
    ///
    /// Without `--reference-dir` the catalogs come from the platform data
    /// directory, which fails when the platform has none.
    pub fn to_config(&self) -> Result<TamisConfig> {
        let mut config = TamisConfig::default()
            .with_duplicate_policy(self.duplicates.into())
            .with_date_range(self.start, self.end);

        config = if self.naive {
            config.with_time_zones(None, None)
        } else {
            config.with_time_zones(Some(self.tz_in.clone()), Some(self.tz_out.clone()))
        };

        if let Some(delimiter) = self.delimiter {
            config = config.with_delimiter(delimiter);
        }
        config = match &self.reference_dir {
            Some(reference_dir) => config.with_reference_dir(reference_dir),
            None => config.with_platform_catalogs()?,
        };
        if !self.no_save {
            config = config.with_output(OutputConfig {
                format: self.format.into(),
                compression: self.compression.into(),
                path: None,
                directory: self.output_dir.clone(),
            });
        }

        Ok(config)
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            verbosity_level(self.verbose)
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

impl ConvertArgs {
    pub fn get_log_level(&self) -> &'static str {
        verbosity_level(self.verbose)
    }
}

fn verbosity_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
