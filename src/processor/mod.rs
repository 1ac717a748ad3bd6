//! Report processing pipeline.
//!
//! Drives one report through header location, typed reading, timestamp
//! normalization, catalog enrichment and the long-to-wide pivot, then
//! optionally saves the result. Catalogs are loaded once per processor and
//! shared read-only by every report it processes.

#[cfg(test)]
pub mod tests;

use crate::config::TamisConfig;
use crate::enrichment::enrich;
use crate::error::Result;
use crate::header::locate_report;
use crate::models::{ProcessedReport, ReportStats};
use crate::reader::read_report;
use crate::reference::ReferenceCatalogs;
use crate::reshape::{pivot_resolved, resolve_duplicates};
use crate::temporal::{DateRange, DatetimeOptions, normalize_datetime, parse_time_zone};
use crate::writer;

use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Converts TAMIS reports into wide, labelled tables
#[derive(Debug)]
pub struct ReportProcessor {
    config: TamisConfig,
    catalogs: ReferenceCatalogs,
}

impl ReportProcessor {
    /// Validate the configuration and load the reference catalogs
    pub fn new(config: TamisConfig) -> Result<Self> {
        config.catalogs.validate()?;
        let catalogs = ReferenceCatalogs::load(&config.catalogs)?;
        Self::with_catalogs(config, catalogs)
    }

    /// Use catalogs that were already loaded
    pub fn with_catalogs(config: TamisConfig, catalogs: ReferenceCatalogs) -> Result<Self> {
        config.validate()?;
        for zone in [&config.input_time_zone, &config.output_time_zone]
            .into_iter()
            .flatten()
        {
            parse_time_zone(zone)?;
        }

        Ok(Self { config, catalogs })
    }

    pub fn config(&self) -> &TamisConfig {
        &self.config
    }

    pub fn catalogs(&self) -> &ReferenceCatalogs {
        &self.catalogs
    }

    fn datetime_options(&self) -> DatetimeOptions {
        DatetimeOptions::default()
            .with_time_zones(
                self.config.input_time_zone.clone(),
                self.config.output_time_zone.clone(),
            )
            .with_range(DateRange::new(self.config.start, self.config.end))
    }

    /// Process a single report, saving it when an output is configured
    pub fn process(&self, report_path: &Path) -> Result<ProcessedReport> {
        let start_time = Instant::now();
        debug!("Processing report {}", report_path.display());

        let layout = locate_report(report_path, self.config.delimiter)?;
        let typed = read_report(report_path, layout)?;
        let raw_rows = typed.data.height();

        let normalized = normalize_datetime(typed.data, &self.datetime_options())?;
        let filtered_rows = raw_rows - normalized.height();

        let (long, joins) = enrich(normalized, &self.catalogs)?;
        let long_rows = long.height();

        let resolved = resolve_duplicates(long, self.config.duplicate_policy)?;
        let duplicate_rows = long_rows - resolved.height();

        let mut wide = pivot_resolved(resolved)?;

        let output_path = match &self.config.output {
            Some(output) => Some(writer::save(&mut wide, report_path, output)?),
            None => None,
        };

        let stats = ReportStats {
            report_path: report_path.to_path_buf(),
            header_row: layout.header_row,
            delimiter: layout.delimiter,
            replaced_bytes: typed.replaced_chars,
            raw_rows,
            blank_lines: typed.blank_lines,
            dropped_columns: typed.dropped_columns,
            filtered_rows,
            joins,
            duplicate_rows,
            output_rows: wide.height(),
            output_columns: wide.width().saturating_sub(crate::constants::columns::WIDE_INDEX.len()),
            processing_time_ms: start_time.elapsed().as_millis(),
        };

        info!(
            "Processed {}: {} observations -> {} rows x {} measurement columns in {}ms",
            report_path.display(),
            raw_rows,
            stats.output_rows,
            stats.output_columns,
            stats.processing_time_ms
        );
        if let Some(path) = &output_path {
            info!("Saved {}", path.display());
        }

        Ok(ProcessedReport {
            data: wide,
            stats,
            output_path,
        })
    }
}
