//! Error handling for TAMIS report processing.
//!
//! Provides error types with context for report format problems,
//! reference catalog loading, join exhaustion and timestamp parsing.

use std::path::PathBuf;
use thiserror::Error;

use crate::models::CatalogKind;

#[derive(Error, Debug)]
pub enum TamisError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Report not found at path: {path}")]
    ReportNotFound { path: PathBuf },

    #[error("No column header line containing \"State Cd\" found in file: {path}")]
    HeaderNotFound { path: PathBuf },

    #[error("No \"Fields Delimited by: \" line found in file: {path}")]
    DelimiterNotFound { path: PathBuf },

    #[error("Unsupported field delimiter {token:?}: {reason}")]
    InvalidDelimiter { token: String, reason: String },

    #[error("Required column '{column}' missing from report: {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Reference catalog not found at path: {path}")]
    ReferenceNotFound { path: PathBuf },

    #[error("Failed to load reference catalog {path} - {reason}")]
    ReferenceLoad { path: PathBuf, reason: String },

    #[error(
        "No matching reference data: joining on '{key}' against the {catalog} catalog dropped all {rows} rows"
    )]
    NoMatchingReference {
        catalog: CatalogKind,
        key: String,
        rows: usize,
    },

    #[error("Invalid time zone '{zone}': {reason}")]
    InvalidTimeZone { zone: String, reason: String },

    #[error("{count} rows have an unparseable date/time (first: {example})")]
    InvalidTimestamp { count: usize, example: String },

    #[error(
        "{count} duplicate observations share the same timestamp, site and column (first: {example}). \
         Choose a duplicate policy (first, last, mean) to resolve them"
    )]
    DuplicateObservations { count: usize, example: String },

    #[error("Failed to write output file: {path} - {reason}")]
    OutputFailed { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

pub type Result<T> = std::result::Result<T, TamisError>;
