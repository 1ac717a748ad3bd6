//! Core data structures and types for TAMIS processing.
//!
//! Defines the report layout detected in the preamble, reference catalog
//! kinds, duplicate resolution policy, and per-report statistics.

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Where the tabular section of a report starts and how it is delimited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportLayout {
    /// Zero-based line index of the column header row
    pub header_row: usize,
    /// Single-byte field separator
    pub delimiter: u8,
}

/// The three reference catalogs joined against a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatalogKind {
    Parameter,
    Unit,
    Site,
}

impl CatalogKind {
    /// Column the catalog is joined on
    pub fn join_key(&self) -> &'static str {
        use crate::constants::columns;
        match self {
            CatalogKind::Parameter => columns::PARAMETER_CODE,
            CatalogKind::Unit => columns::UNIT_CODE,
            CatalogKind::Site => columns::SITE_ID,
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CatalogKind::Parameter => "parameter",
            CatalogKind::Unit => "unit",
            CatalogKind::Site => "site",
        };
        f.write_str(name)
    }
}

/// How repeated (Datetime, Site Name, Site ID, Column_Name) keys are resolved before pivoting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuplicatePolicy {
    /// Fail the invocation, naming the first duplicated key
    #[default]
    Error,
    /// Keep the value from the earliest report row
    First,
    /// Keep the value from the latest report row
    Last,
    /// Average all values sharing the key
    Mean,
}

/// Row counts around one inner join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinStage {
    pub catalog: CatalogKind,
    pub rows_in: usize,
    pub rows_out: usize,
}

impl JoinStage {
    /// Rows with no catalog match
    pub fn dropped(&self) -> usize {
        self.rows_in.saturating_sub(self.rows_out)
    }
}

/// Row counts for the three enrichment joins, in join order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinStats {
    pub stages: Vec<JoinStage>,
}

impl JoinStats {
    pub fn total_dropped(&self) -> usize {
        self.stages.iter().map(JoinStage::dropped).sum()
    }
}

/// Statistics gathered while processing a single report
#[derive(Debug, Clone, Default)]
pub struct ReportStats {
    pub report_path: PathBuf,
    pub header_row: usize,
    pub delimiter: u8,
    /// Bytes that were not valid UTF-8 and were replaced with U+FFFD
    pub replaced_bytes: usize,
    /// Data rows read from the report
    pub raw_rows: usize,
    /// Whitespace-only lines skipped between data rows
    pub blank_lines: usize,
    /// Columns removed because every value was missing
    pub dropped_columns: Vec<String>,
    /// Rows removed by the optional date range filter
    pub filtered_rows: usize,
    pub joins: JoinStats,
    /// Rows collapsed by the duplicate policy
    pub duplicate_rows: usize,
    /// Rows and measurement columns of the wide table
    pub output_rows: usize,
    pub output_columns: usize,
    pub processing_time_ms: u128,
}

/// A processed report: the wide table plus what happened on the way
#[derive(Debug, Clone)]
pub struct ProcessedReport {
    pub data: DataFrame,
    pub stats: ReportStats,
    /// File the table was saved to, when saving is configured
    pub output_path: Option<PathBuf>,
}

/// Summary over a batch of reports processed by the command line front end
#[derive(Debug, Default)]
pub struct BatchStats {
    pub files_processed: usize,
    pub files_failed: usize,
    pub total_rows: usize,
    pub outputs: Vec<PathBuf>,
    pub processing_time_ms: u128,
}
