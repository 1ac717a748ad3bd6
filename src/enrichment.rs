//! Labelling report rows with catalog names.
//!
//! The report is inner-joined against the parameter, unit and site catalogs
//! in that order. Rows without a catalog match are dropped; a join that drops
//! every row of a non-empty table is an error naming the catalog.

use crate::constants::{COLUMN_NAME_PREFIX, columns};
use crate::error::{Result, TamisError};
use crate::models::{CatalogKind, JoinStage, JoinStats};
use crate::reference::ReferenceCatalogs;
use polars::prelude::*;
use tracing::{debug, warn};

const JOIN_ORDER: [CatalogKind; 3] = [CatalogKind::Parameter, CatalogKind::Unit, CatalogKind::Site];

/// Long-format columns kept after enrichment, in order
pub const LONG_COLUMNS: [&str; 5] = [
    columns::VALUE,
    columns::COLUMN_NAME,
    columns::DATETIME,
    columns::SITE_NAME,
    columns::SITE_ID,
];

/// `"TCEQ " + Parameter Name + " (" + Unit Abbr + ")"`, null when either part is missing
pub fn column_name_expr() -> Expr {
    concat_str(
        [
            lit(COLUMN_NAME_PREFIX),
            col(columns::PARAMETER_NAME),
            lit(" ("),
            col(columns::UNIT_ABBR),
            lit(")"),
        ],
        "",
        false,
    )
    .alias(columns::COLUMN_NAME)
}

/// Join the normalized report with all three catalogs and project to the long layout
///
/// Returns (Value, Column_Name, Datetime, Site Name, Site ID) rows in report order.
pub fn enrich(df: DataFrame, catalogs: &ReferenceCatalogs) -> Result<(DataFrame, JoinStats)> {
    let mut current = df
        .lazy()
        .with_columns(
            JOIN_ORDER
                .iter()
                .map(|kind| col(kind.join_key()).cast(DataType::Int64))
                .collect::<Vec<_>>(),
        )
        .collect()?;
    let mut stats = JoinStats::default();

    for kind in JOIN_ORDER {
        let (joined, stage) = join_catalog(current, kind, catalogs.get(kind))?;
        stats.stages.push(stage);
        current = joined;
    }

    let labelled = current.lazy().with_column(column_name_expr()).collect()?;
    let unlabelled = labelled.column(columns::COLUMN_NAME)?.null_count();
    if unlabelled > 0 {
        warn!(
            "Dropping {} rows whose parameter name or unit abbreviation is missing",
            unlabelled
        );
    }

    let long = labelled
        .lazy()
        .filter(col(columns::COLUMN_NAME).is_not_null())
        .select(LONG_COLUMNS.map(col))
        .collect()?;

    debug!(
        "Enriched {} rows ({} dropped by joins)",
        long.height(),
        stats.total_dropped()
    );
    Ok((long, stats))
}

fn join_catalog(
    df: DataFrame,
    kind: CatalogKind,
    catalog: &DataFrame,
) -> Result<(DataFrame, JoinStage)> {
    let key = kind.join_key();
    let rows_in = df.height();

    let args = JoinArgs {
        maintain_order: MaintainOrderJoin::Left,
        ..JoinArgs::new(JoinType::Inner)
    };
    let joined = df
        .lazy()
        .join(catalog.clone().lazy(), [col(key)], [col(key)], args)
        .collect()?;

    let stage = JoinStage {
        catalog: kind,
        rows_in,
        rows_out: joined.height(),
    };

    if rows_in > 0 && stage.rows_out == 0 {
        return Err(TamisError::NoMatchingReference {
            catalog: kind,
            key: key.to_string(),
            rows: rows_in,
        });
    }

    if stage.dropped() > 0 {
        warn!(
            "{} of {} rows have no '{}' match in the {} catalog and were dropped",
            stage.dropped(),
            rows_in,
            key,
            kind
        );
    }

    Ok((joined, stage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogPaths;
    use std::fs;
    use tempfile::TempDir;

    fn catalogs(dir: &TempDir) -> ReferenceCatalogs {
        fs::write(
            dir.path().join("tceq_parameters.csv"),
            "Parm Code,Name\n43202,Ethane\n43203,Ethylene\n44201,Ozone\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("tceq_units.csv"),
            "Code,Description,Abbr,Type\n8,Parts per billion volume,ppbv,Concentration\n7,Parts per million,,Concentration\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("tceq_site_locations.csv"),
            "CAMS,Site Name\n\"1070,1071\",Karnes County\n",
        )
        .unwrap();
        ReferenceCatalogs::load(&CatalogPaths::from_reference_dir(dir.path())).unwrap()
    }

    fn report(parameters: &[i64], units: &[i64], sites: &[i64]) -> DataFrame {
        let n = parameters.len();
        df! {
            "Site ID" => sites,
            "Parameter Cd" => parameters,
            "Unit Cd" => units,
            "Value" => (0..n).map(|v| v as f64).collect::<Vec<_>>(),
            "Datetime" => (0..n as i64).collect::<Vec<_>>(),
        }
        .unwrap()
    }

    #[test]
    fn test_enrich_builds_column_names() {
        let dir = TempDir::new().unwrap();
        let catalogs = catalogs(&dir);
        let df = report(&[43202, 43203], &[8, 8], &[1070, 1071]);

        let (long, stats) = enrich(df, &catalogs).unwrap();

        assert_eq!(long.get_column_names_str(), LONG_COLUMNS.to_vec());
        let names = long.column("Column_Name").unwrap().str().unwrap();
        assert_eq!(names.get(0), Some("TCEQ Ethane (ppbv)"));
        assert_eq!(names.get(1), Some("TCEQ Ethylene (ppbv)"));
        assert_eq!(stats.total_dropped(), 0);
        assert_eq!(stats.stages.len(), 3);
    }

    #[test]
    fn test_unknown_parameter_only_drops_its_rows() {
        let dir = TempDir::new().unwrap();
        let catalogs = catalogs(&dir);
        let df = report(&[43202, 99999, 43202], &[8, 8, 8], &[1070, 1070, 1070]);

        let (long, stats) = enrich(df, &catalogs).unwrap();

        assert_eq!(long.height(), 2);
        assert_eq!(stats.stages[0].dropped(), 1);
        let values: Vec<f64> = long
            .column("Value")
            .unwrap()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(values, vec![0.0, 2.0]);
    }

    #[test]
    fn test_unknown_site_catalog_is_an_error() {
        let dir = TempDir::new().unwrap();
        let catalogs = catalogs(&dir);
        let df = report(&[43202], &[8], &[4242]);

        match enrich(df, &catalogs).unwrap_err() {
            TamisError::NoMatchingReference { catalog, rows, .. } => {
                assert_eq!(catalog, CatalogKind::Site);
                assert_eq!(rows, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_abbreviation_drops_row() {
        let dir = TempDir::new().unwrap();
        let catalogs = catalogs(&dir);
        let df = report(&[43202, 44201], &[8, 7], &[1070, 1070]);

        let (long, _) = enrich(df, &catalogs).unwrap();

        assert_eq!(long.height(), 1);
    }

    #[test]
    fn test_empty_report_passes_through() {
        let dir = TempDir::new().unwrap();
        let catalogs = catalogs(&dir);
        let df = report(&[], &[], &[]);

        let (long, stats) = enrich(df, &catalogs).unwrap();

        assert_eq!(long.height(), 0);
        assert_eq!(stats.total_dropped(), 0);
    }
}
