//! Configuration management and validation.
//!
//! Provides the processing configuration (time zones, duplicate policy,
//! optional date range, output settings) and the resolved locations of the
//! three reference catalogs.

use crate::constants::{
    APP_DATA_DIR_NAME, CENTRAL_STANDARD_TIME, CSV_EXTENSION, PARAMETER_CATALOG_FILE,
    PARQUET_EXTENSION, REFERENCE_DIR_NAME, SITE_CATALOG_FILE, UNIT_CATALOG_FILE,
};
use crate::error::{Result, TamisError};
use crate::models::{CatalogKind, DuplicatePolicy};
use chrono::NaiveDateTime;
use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Locations of the structured parameter, unit and site catalogs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPaths {
    pub parameters: PathBuf,
    pub units: PathBuf,
    pub sites: PathBuf,
}

impl CatalogPaths {
    /// The three catalog files inside a single reference directory
    pub fn from_reference_dir(reference_dir: &Path) -> Self {
        Self {
            parameters: reference_dir.join(PARAMETER_CATALOG_FILE),
            units: reference_dir.join(UNIT_CATALOG_FILE),
            sites: reference_dir.join(SITE_CATALOG_FILE),
        }
    }

    /// `<data_dir>/tamis-processor/ref_files`
    pub fn default_location() -> Result<Self> {
        let data_dir = dirs::data_dir().ok_or_else(|| TamisError::Configuration {
            message: "Unable to determine the platform data directory; pass a reference directory explicitly"
                .to_string(),
        })?;

        Ok(Self::from_reference_dir(
            &data_dir.join(APP_DATA_DIR_NAME).join(REFERENCE_DIR_NAME),
        ))
    }

    /// Path of one catalog
    pub fn path(&self, kind: CatalogKind) -> &Path {
        match kind {
            CatalogKind::Parameter => &self.parameters,
            CatalogKind::Unit => &self.units,
            CatalogKind::Site => &self.sites,
        }
    }

    /// Check that every catalog file exists
    pub fn validate(&self) -> Result<()> {
        for kind in [CatalogKind::Parameter, CatalogKind::Unit, CatalogKind::Site] {
            let path = self.path(kind);
            if !path.is_file() {
                return Err(TamisError::ReferenceNotFound {
                    path: path.to_path_buf(),
                });
            }
        }
        Ok(())
    }
}

/// File format of the saved wide table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => CSV_EXTENSION,
            OutputFormat::Parquet => PARQUET_EXTENSION,
        }
    }
}

/// Supported compression algorithms for parquet files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionAlgorithm {
    /// Snappy compression - good balance of speed and compression
    #[default]
    Snappy,
    /// ZSTD compression - better compression ratio, slower
    Zstd,
    /// LZ4 compression - fastest, lower compression ratio
    Lz4,
    /// Gzip compression - widest reader support
    Gzip,
    /// No compression
    Uncompressed,
}

impl CompressionAlgorithm {
    /// Convert to polars ParquetCompression type
    pub fn to_polars_compression(&self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Gzip => ParquetCompression::Gzip(None),
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }
}

/// Where and how the wide table is saved
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,

    /// Parquet compression; ignored for CSV
    pub compression: CompressionAlgorithm,

    /// Explicit output file; defaults to the report path with the format's extension
    pub path: Option<PathBuf>,

    /// Directory for outputs named after their report; ignored when `path` is set
    pub directory: Option<PathBuf>,
}

impl OutputConfig {
    /// Resolve the output file for a report
    pub fn output_path_for(&self, report_path: &Path) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }

        let beside_report = report_path.with_extension(self.format.extension());
        match (&self.directory, beside_report.file_name()) {
            (Some(directory), Some(file_name)) => directory.join(file_name),
            _ => beside_report,
        }
    }
}

/// Global configuration for TAMIS report processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TamisConfig {
    /// Zone the report's wall-clock times are recorded in; `None` keeps timestamps naive
    pub input_time_zone: Option<String>,

    /// Zone the timestamps are converted to; only applied with an input zone
    pub output_time_zone: Option<String>,

    /// Resolution of repeated (Datetime, Site Name, Site ID, Column_Name) keys
    pub duplicate_policy: DuplicatePolicy,

    /// Field delimiter override; skips the preamble delimiter scan
    pub delimiter: Option<u8>,

    /// Inclusive lower bound on report wall-clock time
    pub start: Option<NaiveDateTime>,

    /// Inclusive upper bound on report wall-clock time
    pub end: Option<NaiveDateTime>,

    /// Save the wide table after processing
    pub output: Option<OutputConfig>,

    /// Reference catalog locations
    pub catalogs: CatalogPaths,
}

/// Catalogs are looked up in `ref_files` under the working directory until
/// [`TamisConfig::with_reference_dir`] or [`TamisConfig::with_platform_catalogs`]
/// points them elsewhere.
impl Default for TamisConfig {
    fn default() -> Self {
        let catalogs = CatalogPaths::from_reference_dir(Path::new(REFERENCE_DIR_NAME));

        Self {
            input_time_zone: Some(CENTRAL_STANDARD_TIME.to_string()),
            output_time_zone: Some(CENTRAL_STANDARD_TIME.to_string()),
            duplicate_policy: DuplicatePolicy::default(),
            delimiter: None,
            start: None,
            end: None,
            output: None,
            catalogs,
        }
    }
}

impl TamisConfig {
    /// Set the input and output zones
    pub fn with_time_zones(
        mut self,
        input_time_zone: Option<String>,
        output_time_zone: Option<String>,
    ) -> Self {
        self.input_time_zone = input_time_zone;
        self.output_time_zone = output_time_zone;
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Force a delimiter instead of reading it from the preamble
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Restrict processing to an inclusive wall-clock range
    pub fn with_date_range(
        mut self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn with_output(mut self, output: OutputConfig) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_catalogs(mut self, catalogs: CatalogPaths) -> Self {
        self.catalogs = catalogs;
        self
    }

    /// Use the catalogs inside `reference_dir`
    pub fn with_reference_dir(self, reference_dir: &Path) -> Self {
        self.with_catalogs(CatalogPaths::from_reference_dir(reference_dir))
    }

    /// Use the catalogs in the platform data directory
    ///
    /// Fails when the platform has no data directory instead of guessing a path.
    pub fn with_platform_catalogs(self) -> Result<Self> {
        Ok(self.with_catalogs(CatalogPaths::default_location()?))
    }

    /// Validate settings that do not need the report itself
    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(TamisError::Configuration {
                    message: format!("Start {} is after end {}", start, end),
                });
            }
        }

        if self.output_time_zone.is_some() && self.input_time_zone.is_none() {
            debug!("Output time zone ignored because no input time zone is set");
        }

        Ok(())
    }
}
