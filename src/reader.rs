//! Typed reading of the tabular section of a TAMIS report.
//!
//! The file is decoded lossily, sliced from the detected header row and
//! handed to the polars CSV reader with the detected delimiter. Columns that
//! carry no values at all are pruned before the required columns are checked.

use crate::constants::columns;
use crate::error::{Result, TamisError};
use crate::models::ReportLayout;
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

/// File contents decoded with invalid byte sequences replaced by U+FFFD
#[derive(Debug, Clone, Default)]
pub struct LossyText {
    pub lines: Vec<String>,
    /// Replacement characters introduced while decoding
    pub replaced_chars: usize,
}

impl LossyText {
    /// Lines from `start` onwards joined with '\n'
    pub fn join_from(&self, start: usize) -> String {
        self.lines.get(start..).unwrap_or_default().join("\n")
    }

    /// Lines from `start` onwards with whitespace-only lines removed
    ///
    /// Returns the joined text and how many blank lines were skipped.
    pub fn data_section(&self, start: usize) -> (String, usize) {
        let (blank, kept): (Vec<&String>, Vec<&String>) = self
            .lines
            .get(start..)
            .unwrap_or_default()
            .iter()
            .partition(|line| line.trim().is_empty());

        let joined = kept
            .iter()
            .map(|line| line.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        (joined, blank.len())
    }
}

/// Read a whole file as text, substituting invalid UTF-8 and stripping carriage returns
pub fn read_lossy_lines(file_path: &Path) -> Result<LossyText> {
    let bytes = std::fs::read(file_path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TamisError::ReportNotFound {
            path: file_path.to_path_buf(),
        },
        _ => TamisError::Io(e),
    })?;

    let text = String::from_utf8_lossy(&bytes);
    let replaced_chars = match &text {
        std::borrow::Cow::Borrowed(_) => 0,
        std::borrow::Cow::Owned(decoded) => {
            decoded
                .matches(char::REPLACEMENT_CHARACTER)
                .count()
                .saturating_sub(bytes_replacement_count(&bytes))
        }
    };

    if replaced_chars > 0 {
        warn!(
            "Replaced {} invalid byte sequences while decoding {}",
            replaced_chars,
            file_path.display()
        );
    }

    let lines = text
        .lines()
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect();

    Ok(LossyText {
        lines,
        replaced_chars,
    })
}

/// U+FFFD characters already present as valid UTF-8 in the source bytes
fn bytes_replacement_count(bytes: &[u8]) -> usize {
    bytes
        .windows(3)
        .filter(|window| *window == [0xEF, 0xBF, 0xBD])
        .count()
}

/// A report's tabular section after typing and pruning
#[derive(Debug, Clone)]
pub struct TypedReport {
    pub data: DataFrame,
    /// Columns removed because every value was missing
    pub dropped_columns: Vec<String>,
    pub replaced_chars: usize,
    /// Whitespace-only lines skipped in the data section
    pub blank_lines: usize,
}

/// Parse the tabular section of a report into a typed DataFrame
pub fn read_report(file_path: &Path, layout: ReportLayout) -> Result<TypedReport> {
    let text = read_lossy_lines(file_path)?;
    let header = text
        .lines
        .get(layout.header_row)
        .ok_or_else(|| TamisError::HeaderNotFound {
            path: file_path.to_path_buf(),
        })?;

    let schema_overwrite = text_column_overrides(header, layout.delimiter);
    let (body, blank_lines) = text.data_section(layout.header_row);
    if blank_lines > 0 {
        debug!(
            "Skipped {} blank lines in the data section of {}",
            blank_lines,
            file_path.display()
        );
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_schema_overwrite(Some(Arc::new(schema_overwrite)))
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(layout.delimiter)
                .with_truncate_ragged_lines(true),
        )
        .into_reader_with_file_handle(Cursor::new(body.into_bytes()))
        .finish()?;

    debug!(
        "Read {} rows x {} columns from {}",
        df.height(),
        df.width(),
        file_path.display()
    );

    let (data, dropped_columns) = drop_all_null_columns(df);
    if !dropped_columns.is_empty() {
        debug!("Dropped all-missing columns: {:?}", dropped_columns);
    }

    ensure_required_columns(&data, file_path)?;
    Ok(TypedReport {
        data,
        dropped_columns,
        replaced_chars: text.replaced_chars,
        blank_lines,
    })
}

/// Dtype overrides for the columns that must not be inferred
///
/// Date and Time stay text so leading zeros and "HH:MM" survive; Value is
/// always floating point. Only columns present in the header are overridden.
fn text_column_overrides(header: &str, delimiter: u8) -> Schema {
    let present: Vec<&str> = header.split(delimiter as char).collect();
    let mut schema = Schema::with_capacity(3);

    for (name, dtype) in [
        (columns::DATE, DataType::String),
        (columns::TIME, DataType::String),
        (columns::VALUE, DataType::Float64),
    ] {
        if present.contains(&name) {
            schema.with_column(name.into(), dtype);
        }
    }

    schema
}

/// Remove every column whose values are all missing
///
/// A frame without rows is returned untouched so an empty report keeps its header.
pub fn drop_all_null_columns(df: DataFrame) -> (DataFrame, Vec<String>) {
    let height = df.height();
    if height == 0 {
        return (df, Vec::new());
    }

    let dropped: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|column| column.null_count() == height)
        .map(|column| column.name().to_string())
        .collect();

    if dropped.is_empty() {
        return (df, dropped);
    }

    (df.drop_many(dropped.iter().map(String::as_str)), dropped)
}

/// Fail with the first required column the report lacks
pub fn ensure_required_columns(df: &DataFrame, file_path: &Path) -> Result<()> {
    let schema = df.schema();
    match columns::REQUIRED
        .iter()
        .find(|column| !schema.contains(column))
    {
        Some(column) => Err(TamisError::MissingColumn {
            path: file_path.to_path_buf(),
            column: column.to_string(),
        }),
        None => Ok(()),
    }
}
