//! Saving the wide table as CSV or Parquet.

use crate::config::{CompressionAlgorithm, OutputConfig, OutputFormat};
use crate::error::{Result, TamisError};
use polars::prelude::{
    CsvWriter, DataFrame, ParquetWriter, SerWriter, StatisticsOptions,
};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Save the table for `report_path` according to `output`, returning the file written
pub fn save(df: &mut DataFrame, report_path: &Path, output: &OutputConfig) -> Result<PathBuf> {
    let output_path = output.output_path_for(report_path);

    match output.format {
        OutputFormat::Csv => write_csv(df, &output_path)?,
        OutputFormat::Parquet => write_parquet(df, &output_path, output.compression)?,
    }

    Ok(output_path)
}

/// Write a DataFrame as comma-delimited text with a header row
pub fn write_csv(df: &mut DataFrame, output_path: &Path) -> Result<()> {
    let file = create_output(output_path)?;

    CsvWriter::new(file)
        .include_header(true)
        .finish(df)
        .map_err(|e| TamisError::OutputFailed {
            path: output_path.to_path_buf(),
            reason: format!("Failed to write CSV: {}", e),
        })?;

    debug!("Wrote {} rows to {}", df.height(), output_path.display());
    Ok(())
}

/// Write a DataFrame as Parquet with full column statistics
pub fn write_parquet(
    df: &mut DataFrame,
    output_path: &Path,
    compression: CompressionAlgorithm,
) -> Result<()> {
    let file = create_output(output_path)?;

    ParquetWriter::new(file)
        .with_compression(compression.to_polars_compression())
        .with_statistics(StatisticsOptions::full())
        .finish(df)
        .map_err(|e| TamisError::OutputFailed {
            path: output_path.to_path_buf(),
            reason: format!("Failed to write parquet: {}", e),
        })?;

    debug!(
        "Wrote {} rows to {} ({:?})",
        df.height(),
        output_path.display(),
        compression
    );
    Ok(())
}

fn create_output(output_path: &Path) -> Result<File> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    File::create(output_path).map_err(|e| TamisError::OutputFailed {
        path: output_path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use tempfile::TempDir;

    fn sample() -> DataFrame {
        df! {
            "Site Name" => ["Karnes County", "Karnes County"],
            "Site ID" => [1070i64, 1070],
            "TCEQ Ethane (ppbv)" => [55.055, 44.3327],
        }
        .unwrap()
    }

    #[test]
    fn test_csv_written_beside_report() {
        let temp_dir = TempDir::new().unwrap();
        let report = temp_dir.path().join("karnes.txt");
        let mut df = sample();

        let written = save(&mut df, &report, &OutputConfig::default()).unwrap();

        assert_eq!(written, temp_dir.path().join("karnes.csv"));
        let content = std::fs::read_to_string(&written).unwrap();
        assert!(content.starts_with("Site Name,Site ID,TCEQ Ethane (ppbv)"));
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_parquet_round_trip_keeps_values() {
        let temp_dir = TempDir::new().unwrap();
        let report = temp_dir.path().join("karnes.txt");
        let mut df = sample();
        let output = OutputConfig {
            format: OutputFormat::Parquet,
            compression: CompressionAlgorithm::Zstd,
            ..Default::default()
        };

        let written = save(&mut df, &report, &output).unwrap();

        assert_eq!(written.extension().unwrap(), "parquet");
        let read_back = ParquetReader::new(File::open(&written).unwrap())
            .finish()
            .unwrap();
        assert!(read_back.equals_missing(&sample()));
    }

    #[test]
    fn test_output_directory_is_created() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("nested").join("wide.csv");
        let mut df = sample();

        write_csv(&mut df, &target).unwrap();

        assert!(target.exists());
    }
}
