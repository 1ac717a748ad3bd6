//! Basic processing integration tests

use super::{ETHANE, Fixture};
use crate::config::{CompressionAlgorithm, OutputConfig, OutputFormat};
use crate::constants::{CENTRAL_STANDARD_TIME, MOUNTAIN_STANDARD_TIME};
use crate::processor::ReportProcessor;
use chrono::{FixedOffset, TimeZone as _};
use polars::prelude::*;
use std::fs::File;

fn datetime_micros(df: &DataFrame) -> Vec<i64> {
    df.column("Datetime")
        .unwrap()
        .datetime()
        .unwrap()
        .physical()
        .into_no_null_iter()
        .collect()
}

fn zone_of(df: &DataFrame) -> Option<String> {
    match df.column("Datetime").unwrap().dtype() {
        DataType::Datetime(_, zone) => zone.as_ref().map(|z| z.to_string()),
        other => panic!("Datetime has dtype {other:?}"),
    }
}

fn cst(hour: u32) -> i64 {
    FixedOffset::west_opt(6 * 3600)
        .unwrap()
        .with_ymd_and_hms(2025, 4, 7, hour, 0, 0)
        .unwrap()
        .timestamp_micros()
}

#[test]
fn test_ethane_end_to_end() {
    let fixture = Fixture::new();
    let report = fixture.report("karnes.txt", ',', ETHANE);
    let processor = ReportProcessor::new(fixture.config.clone()).unwrap();

    let processed = processor.process(&report).unwrap();
    let df = &processed.data;

    assert_eq!(
        df.get_column_names_str(),
        vec!["Datetime", "Site Name", "Site ID", "TCEQ Ethane (ppbv)"]
    );
    assert_eq!(df.height(), 2);
    let values: Vec<f64> = df
        .column("TCEQ Ethane (ppbv)")
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    assert_eq!(values, vec![55.055, 44.3327]);
    let sites = df.column("Site Name").unwrap().str().unwrap();
    assert_eq!(sites.get(0), Some("Karnes County"));
    assert_eq!(datetime_micros(df), vec![cst(0), cst(3)]);
    assert_eq!(zone_of(df).as_deref(), Some("Etc/GMT+6"));

    let stats = &processed.stats;
    assert_eq!(stats.header_row, 10);
    assert_eq!(stats.delimiter, b',');
    assert_eq!(stats.raw_rows, 2);
    assert_eq!(stats.output_rows, 2);
    assert_eq!(stats.output_columns, 1);
    assert_eq!(stats.joins.total_dropped(), 0);
    assert!(processed.output_path.is_none());
}

#[test]
fn test_delimiter_invariance() {
    let fixture = Fixture::new();
    let processor = ReportProcessor::new(fixture.config.clone()).unwrap();

    let comma = processor
        .process(&fixture.report("comma.txt", ',', ETHANE))
        .unwrap();
    let pipe = processor
        .process(&fixture.report("pipe.txt", '|', ETHANE))
        .unwrap();
    let tab = processor
        .process(&fixture.report("tab.txt", '\t', ETHANE))
        .unwrap();

    assert!(comma.data.equals_missing(&pipe.data));
    assert!(comma.data.equals_missing(&tab.data));
    assert_eq!(tab.stats.delimiter, b'\t');
}

#[test]
fn test_all_null_columns_are_pruned() {
    let fixture = Fixture::new();
    let report = fixture.report("karnes.txt", ',', ETHANE);
    let processor = ReportProcessor::new(fixture.config.clone()).unwrap();

    let processed = processor.process(&report).unwrap();

    let dropped = &processed.stats.dropped_columns;
    assert!(dropped.contains(&"Null Data Cd".to_string()));
    assert!(dropped.contains(&"Uncertainty Value".to_string()));
    assert!(!dropped.contains(&"Value".to_string()));
}

#[test]
fn test_output_zone_conversion_keeps_instants() {
    let fixture = Fixture::new();
    let report = fixture.report("karnes.txt", ',', ETHANE);
    let config = fixture.config.clone().with_time_zones(
        Some(CENTRAL_STANDARD_TIME.to_string()),
        Some(MOUNTAIN_STANDARD_TIME.to_string()),
    );
    let processor = ReportProcessor::new(config).unwrap();

    let processed = processor.process(&report).unwrap();

    assert_eq!(datetime_micros(&processed.data), vec![cst(0), cst(3)]);
    assert_eq!(zone_of(&processed.data).as_deref(), Some("Etc/GMT+7"));
}

#[test]
fn test_naive_timestamps_without_input_zone() {
    let fixture = Fixture::new();
    let report = fixture.report("karnes.txt", ',', ETHANE);
    let config = fixture.config.clone().with_time_zones(None, None);
    let processor = ReportProcessor::new(config).unwrap();

    let processed = processor.process(&report).unwrap();

    assert_eq!(zone_of(&processed.data), None);
}

#[test]
fn test_empty_report_yields_empty_table() {
    let fixture = Fixture::new();
    let report = fixture.report("empty.txt", ',', &[]);
    let processor = ReportProcessor::new(fixture.config.clone()).unwrap();

    let processed = processor.process(&report).unwrap();

    assert_eq!(processed.data.height(), 0);
    assert_eq!(
        processed.data.get_column_names_str(),
        vec!["Datetime", "Site Name", "Site ID"]
    );
}

#[test]
fn test_date_range_filter() {
    let fixture = Fixture::new();
    let report = fixture.report("karnes.txt", ',', ETHANE);
    let start = chrono::NaiveDate::from_ymd_opt(2025, 4, 7)
        .unwrap()
        .and_hms_opt(1, 0, 0)
        .unwrap();
    let config = fixture.config.clone().with_date_range(Some(start), None);
    let processor = ReportProcessor::new(config).unwrap();

    let processed = processor.process(&report).unwrap();

    assert_eq!(processed.data.height(), 1);
    assert_eq!(processed.stats.filtered_rows, 1);
    assert_eq!(datetime_micros(&processed.data), vec![cst(3)]);
}

#[test]
fn test_saves_csv_beside_report() {
    let fixture = Fixture::new();
    let report = fixture.report("karnes.txt", ',', ETHANE);
    let config = fixture.config.clone().with_output(OutputConfig::default());
    let processor = ReportProcessor::new(config).unwrap();

    let processed = processor.process(&report).unwrap();

    let saved = processed.output_path.unwrap();
    assert_eq!(saved, fixture.temp_dir.path().join("karnes.csv"));
    let content = std::fs::read_to_string(saved).unwrap();
    let mut lines = content.lines();
    assert_eq!(
        lines.next(),
        Some("Datetime,Site Name,Site ID,TCEQ Ethane (ppbv)")
    );
    assert_eq!(lines.count(), 2);
}

#[test]
fn test_saves_parquet_with_zone() {
    let fixture = Fixture::new();
    let report = fixture.report("karnes.txt", ',', ETHANE);
    let config = fixture.config.clone().with_output(OutputConfig {
        format: OutputFormat::Parquet,
        compression: CompressionAlgorithm::Snappy,
        ..Default::default()
    });
    let processor = ReportProcessor::new(config).unwrap();

    let processed = processor.process(&report).unwrap();

    let saved = processed.output_path.unwrap();
    assert_eq!(saved, fixture.temp_dir.path().join("karnes.parquet"));
    let read_back = ParquetReader::new(File::open(saved).unwrap())
        .finish()
        .unwrap();
    assert_eq!(read_back.height(), 2);
    assert_eq!(zone_of(&read_back).as_deref(), Some("Etc/GMT+6"));
}

#[test]
fn test_invalid_bytes_are_not_fatal() {
    let fixture = Fixture::new();
    let mut bytes = b"Prepared for \xff\xfe Karnes\n".to_vec();
    bytes.extend_from_slice(super::report_text(',', ETHANE).as_bytes());
    let report = fixture.temp_dir.path().join("latin1.txt");
    std::fs::write(&report, bytes).unwrap();
    let processor = ReportProcessor::new(fixture.config.clone()).unwrap();

    let processed = processor.process(&report).unwrap();

    assert_eq!(processed.data.height(), 2);
    assert_eq!(processed.stats.header_row, 11);
    assert!(processed.stats.replaced_bytes >= 1);
}

#[test]
fn test_blank_lines_between_and_after_rows() {
    let fixture = Fixture::new();
    let text = super::report_text(',', ETHANE);
    let (body, last_row) = text.trim_end().rsplit_once('\n').unwrap();
    let with_blanks = format!("{body}\n\n{last_row}\n\n\n");
    let report = fixture.temp_dir.path().join("blank_lines.txt");
    std::fs::write(&report, with_blanks).unwrap();
    let processor = ReportProcessor::new(fixture.config.clone()).unwrap();

    let processed = processor.process(&report).unwrap();

    assert_eq!(processed.data.height(), 2);
    assert_eq!(datetime_micros(&processed.data), vec![cst(0), cst(3)]);
    assert_eq!(processed.stats.raw_rows, 2);
    assert_eq!(processed.stats.blank_lines, 3);
}
