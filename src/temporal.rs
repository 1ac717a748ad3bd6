//! Combining report Date and Time fields into one timestamp.
//!
//! Reports record wall-clock local standard time in separate `Date`
//! (`%Y%m%d`) and `Time` (`%H:%M`) fields. These are parsed, combined into a
//! microsecond `Datetime`, optionally range-filtered, then given the report's
//! zone and converted to the output zone.

use crate::constants::{DATE_FORMAT, TIME_FORMAT, columns};
use crate::error::{Result, TamisError};
use chrono::NaiveDateTime;
use polars::prelude::*;
use tracing::debug;

/// Inclusive wall-clock bounds applied before a zone is attached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        Self { start, end }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Filter predicate on a naive microsecond datetime column
    fn predicate(&self, column: &str) -> Option<Expr> {
        let bound = |value: NaiveDateTime| {
            lit(value).cast(DataType::Datetime(TimeUnit::Microseconds, None))
        };

        let lower = self.start.map(|start| col(column).gt_eq(bound(start)));
        let upper = self.end.map(|end| col(column).lt_eq(bound(end)));

        match (lower, upper) {
            (Some(lower), Some(upper)) => Some(lower.and(upper)),
            (lower, upper) => lower.or(upper),
        }
    }
}

/// How the Date and Time columns are parsed and which zones apply
#[derive(Debug, Clone, PartialEq)]
pub struct DatetimeOptions {
    pub date_column: String,
    pub date_format: String,
    pub time_column: String,
    pub time_format: String,
    /// Zone the wall-clock values are recorded in; `None` leaves them naive
    pub input_time_zone: Option<String>,
    /// Zone to convert to, only honoured together with an input zone
    pub output_time_zone: Option<String>,
    pub range: DateRange,
}

impl Default for DatetimeOptions {
    fn default() -> Self {
        Self {
            date_column: columns::DATE.to_string(),
            date_format: DATE_FORMAT.to_string(),
            time_column: columns::TIME.to_string(),
            time_format: TIME_FORMAT.to_string(),
            input_time_zone: None,
            output_time_zone: None,
            range: DateRange::default(),
        }
    }
}

impl DatetimeOptions {
    pub fn with_time_zones(
        mut self,
        input_time_zone: Option<String>,
        output_time_zone: Option<String>,
    ) -> Self {
        self.input_time_zone = input_time_zone;
        self.output_time_zone = output_time_zone;
        self
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }
}

/// Validate an IANA zone name such as "Etc/GMT+6"
pub fn parse_time_zone(name: &str) -> Result<TimeZone> {
    TimeZone::opt_try_new(Some(name))
        .map_err(|e| TamisError::InvalidTimeZone {
            zone: name.to_string(),
            reason: e.to_string(),
        })?
        .ok_or_else(|| TamisError::InvalidTimeZone {
            zone: name.to_string(),
            reason: "zone name is empty".to_string(),
        })
}

/// Replace the Date and Time columns with a combined `Datetime` column
///
/// Rows outside `options.range` are removed. Any row whose date or time
/// cannot be parsed fails the whole table with [`TamisError::InvalidTimestamp`].
pub fn normalize_datetime(df: DataFrame, options: &DatetimeOptions) -> Result<DataFrame> {
    let input_zone = options
        .input_time_zone
        .as_deref()
        .map(parse_time_zone)
        .transpose()?;
    let output_zone = options
        .output_time_zone
        .as_deref()
        .map(parse_time_zone)
        .transpose()?;

    let date_text = col(options.date_column.as_str()).cast(DataType::String);
    let time_text = col(options.time_column.as_str()).cast(DataType::String);

    let date = date_text
        .clone()
        .str()
        .to_date(lenient_format(&options.date_format));
    let time = time_text
        .clone()
        .str()
        .to_time(lenient_format(&options.time_format));

    let combined = df
        .lazy()
        .with_column(
            date.dt()
                .combine(time, TimeUnit::Microseconds)
                .alias(columns::DATETIME),
        )
        .collect()?;

    ensure_timestamps_parsed(&combined, date_text, time_text)?;

    let mut frame = combined
        .lazy()
        .drop(cols([options.date_column.as_str(), options.time_column.as_str()]));

    if !options.range.is_unbounded() {
        debug!(
            "Restricting to wall-clock range {:?} ..= {:?}",
            options.range.start, options.range.end
        );
    }
    if let Some(predicate) = options.range.predicate(columns::DATETIME) {
        frame = frame.filter(predicate);
    }

    if let Some(zone) = input_zone {
        debug!("Attaching time zone {}", zone);
        frame = frame.with_column(col(columns::DATETIME).dt().replace_time_zone(
            Some(zone),
            lit("raise"),
            NonExistent::Raise,
        ));

        if let Some(zone) = output_zone {
            debug!("Converting timestamps to {}", zone);
            frame = frame.with_column(col(columns::DATETIME).dt().convert_time_zone(zone));
        }
    }

    Ok(frame.collect()?)
}

fn lenient_format(format: &str) -> StrptimeOptions {
    StrptimeOptions {
        format: Some(format.into()),
        strict: false,
        exact: true,
        cache: true,
    }
}

/// Every row must have produced a timestamp
fn ensure_timestamps_parsed(df: &DataFrame, date_text: Expr, time_text: Expr) -> Result<()> {
    let failures = df.column(columns::DATETIME)?.null_count();
    if failures == 0 {
        return Ok(());
    }

    let first = df
        .clone()
        .lazy()
        .filter(col(columns::DATETIME).is_null())
        .select([concat_str([date_text, time_text], " ", true).alias("example")])
        .limit(1)
        .collect()?;

    let example = first
        .column("example")?
        .str()?
        .get(0)
        .unwrap_or("<missing>")
        .to_string();

    Err(TamisError::InvalidTimestamp {
        count: failures,
        example,
    })
}
