//! Application constants for the TAMIS processor
//!
//! Report markers, canonical column names, reference catalog file names
//! and time zone defaults used throughout the pipeline.

// =============================================================================
// Report Markers
// =============================================================================

/// Substring identifying the column header line of a TAMIS report
pub const HEADER_MARKER: &str = "State Cd";

/// Substring preceding the field delimiter token in the report preamble
pub const DELIMITER_MARKER: &str = "Fields Delimited by: ";

/// Delimiter token that stands for a horizontal tab
pub const TAB_TOKEN: &str = "Tab";

// =============================================================================
// Report Columns
// =============================================================================

pub mod columns {
    pub const DATE: &str = "Date";
    pub const TIME: &str = "Time";
    pub const VALUE: &str = "Value";
    pub const SITE_ID: &str = "Site ID";
    pub const PARAMETER_CODE: &str = "Parameter Cd";
    pub const UNIT_CODE: &str = "Unit Cd";

    /// Combined timestamp produced by the temporal normalizer
    pub const DATETIME: &str = "Datetime";

    pub const PARAMETER_NAME: &str = "Parameter Name";
    pub const UNIT_DESCRIPTION: &str = "Unit Description";
    pub const UNIT_ABBR: &str = "Unit Abbr";
    pub const UNIT_TYPE: &str = "Unit Type";
    pub const SITE_NAME: &str = "Site Name";

    /// Derived pivot header, "TCEQ {Parameter Name} ({Unit Abbr})"
    pub const COLUMN_NAME: &str = "Column_Name";

    /// Columns the pipeline cannot proceed without
    pub const REQUIRED: &[&str] = &[DATE, TIME, VALUE, PARAMETER_CODE, UNIT_CODE, SITE_ID];

    /// Leading key columns of the wide output table
    pub const WIDE_INDEX: &[&str] = &[DATETIME, SITE_NAME, SITE_ID];
}

/// Prefix of every derived measurement column
pub const COLUMN_NAME_PREFIX: &str = "TCEQ ";

// =============================================================================
// Date and Time Parsing
// =============================================================================

/// Date format used by TAMIS reports (e.g. 20250407)
pub const DATE_FORMAT: &str = "%Y%m%d";

/// Time format used by TAMIS reports (e.g. 13:00)
pub const TIME_FORMAT: &str = "%H:%M";

/// Central standard time without daylight saving, covering most of Texas
pub const CENTRAL_STANDARD_TIME: &str = "Etc/GMT+6";

/// Mountain standard time without daylight saving, for far-west stations near El Paso
pub const MOUNTAIN_STANDARD_TIME: &str = "Etc/GMT+7";

// =============================================================================
// Reference Catalogs
// =============================================================================

/// Structured (comma-delimited) catalog file names inside the reference directory
pub const PARAMETER_CATALOG_FILE: &str = "tceq_parameters.csv";
pub const UNIT_CATALOG_FILE: &str = "tceq_units.csv";
pub const SITE_CATALOG_FILE: &str = "tceq_site_locations.csv";

/// Raw (tab-delimited) catalog file names as downloaded from GeoTAMIS
pub const RAW_PARAMETER_CATALOG_FILE: &str = "tceq_parameters.txt";
pub const RAW_UNIT_CATALOG_FILE: &str = "tceq_units.txt";
pub const RAW_SITE_CATALOG_FILE: &str = "tceq_site_locations.txt";

/// Application directory name under the platform data directory
pub const APP_DATA_DIR_NAME: &str = "tamis-processor";

/// Reference directory name inside the application data directory
pub const REFERENCE_DIR_NAME: &str = "ref_files";

/// Source-to-canonical column renames for the parameter catalog
pub const PARAMETER_RENAMES: &[(&str, &str)] =
    &[("Parm Code", columns::PARAMETER_CODE), ("Name", columns::PARAMETER_NAME)];

/// Source-to-canonical column renames for the unit catalog
pub const UNIT_RENAMES: &[(&str, &str)] = &[
    ("Code", columns::UNIT_CODE),
    ("Description", columns::UNIT_DESCRIPTION),
    ("Abbr", columns::UNIT_ABBR),
    ("Type", columns::UNIT_TYPE),
];

/// Source-to-canonical column renames for the site catalog
pub const SITE_RENAMES: &[(&str, &str)] = &[("CAMS", columns::SITE_ID)];

// =============================================================================
// Output
// =============================================================================

/// Extension given to CSV output written beside the report
pub const CSV_EXTENSION: &str = "csv";

/// Extension given to Parquet output written beside the report
///
/// Earlier TAMIS tooling named its Parquet files `.gzip` after the codec;
/// the suffix here names the container so any compression reads back the same.
pub const PARQUET_EXTENSION: &str = "parquet";

/// Extension of raw TAMIS report files when expanding directories
pub const REPORT_EXTENSION: &str = "txt";
