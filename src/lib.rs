//! TAMIS Processor Library
//!
//! A Rust library for converting TCEQ TAMIS/GeoTAMIS raw-data transaction
//! reports into wide, labelled tables.
//!
//! This library provides tools for:
//! - Locating the column header and field delimiter in a report preamble
//! - Reading reports with unknown or partly invalid text encoding
//! - Building zone-aware timestamps from separate date and time fields
//! - Labelling measurements from parameter, unit and site reference catalogs
//! - Pivoting long observations into one column per parameter and unit
//! - Writing the result as CSV or compressed Parquet

pub mod cli {
    pub mod args;
    pub mod commands;
}

pub mod config;
pub mod constants;
pub mod enrichment;
pub mod error;
pub mod header;
pub mod models;
pub mod processor;
pub mod reader;
pub mod reference;
pub mod reshape;
pub mod temporal;
pub mod writer;

// Re-export commonly used types
pub use config::{CatalogPaths, CompressionAlgorithm, OutputConfig, OutputFormat, TamisConfig};
pub use error::{Result, TamisError};
pub use models::{DuplicatePolicy, ProcessedReport, ReportStats};
pub use processor::ReportProcessor;
pub use reference::ReferenceCatalogs;
