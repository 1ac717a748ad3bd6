//! Long-to-wide reshaping of enriched observations.
//!
//! Repeated (Datetime, Site Name, Site ID, Column_Name) keys are resolved
//! under an explicit [`DuplicatePolicy`] before the pivot, so the pivot itself
//! never has to aggregate.

use crate::constants::columns;
use crate::enrichment::LONG_COLUMNS;
use crate::error::{Result, TamisError};
use crate::models::DuplicatePolicy;
use polars::lazy::frame::pivot::pivot_stable;
use polars::prelude::*;
use tracing::{debug, warn};

/// Columns identifying one observation cell of the wide table
const OBSERVATION_KEY: [&str; 4] = [
    columns::DATETIME,
    columns::SITE_NAME,
    columns::SITE_ID,
    columns::COLUMN_NAME,
];

/// Collapse repeated observation keys according to `policy`
///
/// A table without repeats is returned as-is under every policy.
pub fn resolve_duplicates(long: DataFrame, policy: DuplicatePolicy) -> Result<DataFrame> {
    let repeated = long
        .clone()
        .lazy()
        .group_by_stable(OBSERVATION_KEY.map(col))
        .agg([len().alias("count")])
        .filter(col("count").gt(lit(1)))
        .collect()?;

    if repeated.height() == 0 {
        return Ok(long);
    }

    let extra_rows = repeated
        .column("count")?
        .cast(&DataType::Int64)?
        .i64()?
        .into_iter()
        .flatten()
        .map(|count| count as usize - 1)
        .sum::<usize>();
    let example = describe_first_key(&repeated)?;

    let resolved = match policy {
        DuplicatePolicy::Error => {
            return Err(TamisError::DuplicateObservations {
                count: extra_rows,
                example,
            });
        }
        DuplicatePolicy::First => long
            .lazy()
            .unique_stable(Some(cols(OBSERVATION_KEY)), UniqueKeepStrategy::First),
        DuplicatePolicy::Last => long
            .lazy()
            .unique_stable(Some(cols(OBSERVATION_KEY)), UniqueKeepStrategy::Last),
        DuplicatePolicy::Mean => long
            .lazy()
            .group_by_stable(OBSERVATION_KEY.map(col))
            .agg([col(columns::VALUE).mean()])
            .select(LONG_COLUMNS.map(col)),
    }
    .collect()?;

    warn!(
        "Resolved {} duplicate observations with policy {:?} (first: {})",
        extra_rows, policy, example
    );
    Ok(resolved)
}

fn describe_first_key(repeated: &DataFrame) -> Result<String> {
    let parts = OBSERVATION_KEY
        .iter()
        .map(|name| Ok(format!("{}={}", name, repeated.column(name)?.get(0)?)))
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join(", "))
}

/// Pivot the long table into one row per (Datetime, Site Name, Site ID)
///
/// Measurement columns appear in order of first appearance. Rows are sorted
/// by Datetime with Site ID as a tie-breaker. An empty input yields an empty
/// table with only the three key columns.
pub fn pivot_wide(long: DataFrame, policy: DuplicatePolicy) -> Result<DataFrame> {
    pivot_resolved(resolve_duplicates(long, policy)?)
}

/// Pivot a long table whose observation keys are already unique
pub fn pivot_resolved(resolved: DataFrame) -> Result<DataFrame> {
    let wide = if resolved.height() == 0 {
        resolved.select(columns::WIDE_INDEX.iter().copied())?
    } else {
        pivot_stable(
            &resolved,
            [columns::COLUMN_NAME],
            Some(columns::WIDE_INDEX.iter().copied()),
            Some([columns::VALUE]),
            false,
            None,
            None,
        )?
    };

    let wide = wide
        .lazy()
        .sort_by_exprs(
            [col(columns::DATETIME), col(columns::SITE_ID)],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .collect()?;

    debug!(
        "Pivoted to {} rows x {} measurement columns",
        wide.height(),
        wide.width().saturating_sub(columns::WIDE_INDEX.len())
    );
    Ok(wide)
}
