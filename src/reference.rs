//! Reference catalogs used to label report codes.
//!
//! Three catalogs map parameter codes to names, unit codes to abbreviations
//! and site IDs to site names. They are loaded once per processor, their
//! column names canonicalized and their join keys normalized to integers.
//! Raw tab-delimited catalogs downloaded from GeoTAMIS can be converted into
//! the structured CSV form with [`convert_raw_catalogs`].

use crate::config::CatalogPaths;
use crate::constants::{
    PARAMETER_RENAMES, RAW_PARAMETER_CATALOG_FILE, RAW_SITE_CATALOG_FILE, RAW_UNIT_CATALOG_FILE,
    SITE_RENAMES, UNIT_RENAMES, columns,
};
use crate::error::{Result, TamisError};
use crate::models::CatalogKind;
use crate::reader::read_lossy_lines;
use crate::writer::write_csv;
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info, warn};

/// The loaded, normalized catalogs
#[derive(Debug, Clone)]
pub struct ReferenceCatalogs {
    parameters: DataFrame,
    units: DataFrame,
    sites: DataFrame,
}

impl ReferenceCatalogs {
    /// Load all three catalogs; any failure is fatal
    pub fn load(paths: &CatalogPaths) -> Result<Self> {
        let parameters = load_parameter_catalog(&paths.parameters)?;
        let units = load_unit_catalog(&paths.units)?;
        let sites = load_site_catalog(&paths.sites)?;

        info!(
            "Loaded reference catalogs: {} parameters, {} units, {} site IDs",
            parameters.height(),
            units.height(),
            sites.height()
        );

        Ok(Self {
            parameters,
            units,
            sites,
        })
    }

    pub fn get(&self, kind: CatalogKind) -> &DataFrame {
        match kind {
            CatalogKind::Parameter => &self.parameters,
            CatalogKind::Unit => &self.units,
            CatalogKind::Site => &self.sites,
        }
    }

    pub fn parameters(&self) -> &DataFrame {
        &self.parameters
    }

    pub fn units(&self) -> &DataFrame {
        &self.units
    }

    pub fn sites(&self) -> &DataFrame {
        &self.sites
    }
}

/// Columns kept from each catalog: (required, optional)
fn catalog_columns(kind: CatalogKind) -> (&'static [&'static str], &'static [&'static str]) {
    match kind {
        CatalogKind::Parameter => (&[columns::PARAMETER_CODE, columns::PARAMETER_NAME], &[]),
        CatalogKind::Unit => (
            &[columns::UNIT_CODE, columns::UNIT_ABBR],
            &[columns::UNIT_DESCRIPTION, columns::UNIT_TYPE],
        ),
        CatalogKind::Site => (&[columns::SITE_ID, columns::SITE_NAME], &[]),
    }
}

fn catalog_renames(kind: CatalogKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        CatalogKind::Parameter => PARAMETER_RENAMES,
        CatalogKind::Unit => UNIT_RENAMES,
        CatalogKind::Site => SITE_RENAMES,
    }
}

/// Parameter Cd -> Parameter Name
pub fn load_parameter_catalog(path: &Path) -> Result<DataFrame> {
    load_catalog(CatalogKind::Parameter, path, b',')
}

/// Unit Cd -> Unit Abbr, plus Unit Description and Unit Type when present
pub fn load_unit_catalog(path: &Path) -> Result<DataFrame> {
    load_catalog(CatalogKind::Unit, path, b',')
}

/// Site ID -> Site Name, one row per site ID
pub fn load_site_catalog(path: &Path) -> Result<DataFrame> {
    load_catalog(CatalogKind::Site, path, b',')
}

fn load_catalog(kind: CatalogKind, path: &Path, separator: u8) -> Result<DataFrame> {
    let raw = read_catalog_file(path, separator)?;
    let catalog = normalize_catalog(kind, raw).map_err(|e| match e {
        TamisError::Polars(e) => TamisError::ReferenceLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
        TamisError::Configuration { message } => TamisError::ReferenceLoad {
            path: path.to_path_buf(),
            reason: message,
        },
        other => other,
    })?;

    debug!(
        "Loaded {} catalog from {}: {} rows",
        kind,
        path.display(),
        catalog.height()
    );
    Ok(catalog)
}

fn read_catalog_file(path: &Path, separator: u8) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(TamisError::ReferenceNotFound {
            path: path.to_path_buf(),
        });
    }

    let text = read_lossy_lines(path)?;
    if text.replaced_chars > 0 {
        warn!(
            "Reference catalog {} contains {} undecodable bytes",
            path.display(),
            text.replaced_chars
        );
    }

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(separator)
                .with_truncate_ragged_lines(true),
        )
        .into_reader_with_file_handle(Cursor::new(text.join_from(0).into_bytes()))
        .finish()
        .map_err(|e| TamisError::ReferenceLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Canonicalize names, keep the catalog's columns, normalize and de-duplicate the key
fn normalize_catalog(kind: CatalogKind, mut raw: DataFrame) -> Result<DataFrame> {
    for (from, to) in catalog_renames(kind) {
        let schema = raw.schema().clone();
        if schema.contains(from) && !schema.contains(to) {
            raw.rename(from, (*to).into())?;
        }
    }

    let (required, optional) = catalog_columns(kind);
    let schema = raw.schema().clone();
    if let Some(missing) = required.iter().find(|column| !schema.contains(column)) {
        return Err(TamisError::Configuration {
            message: format!("missing column '{}'", missing),
        });
    }

    let key = kind.join_key();
    let kept: Vec<Expr> = required
        .iter()
        .chain(optional.iter().filter(|column| schema.contains(column)))
        .map(|column| {
            if *column == key {
                col(*column)
            } else {
                col(*column).cast(DataType::String)
            }
        })
        .collect();

    let mut catalog = raw.lazy().select(kept);
    if kind == CatalogKind::Site {
        catalog = explode_site_ids(catalog);
    }

    let catalog = catalog
        .with_column(col(key).strict_cast(DataType::Int64))
        .filter(col(key).is_not_null())
        .collect()?;

    let rows = catalog.height();
    let catalog = catalog
        .lazy()
        .unique_stable(Some(cols([key])), UniqueKeepStrategy::First)
        .collect()?;

    if catalog.height() < rows {
        warn!(
            "{} catalog lists {} repeated '{}' entries; keeping the first of each",
            kind,
            rows - catalog.height(),
            key
        );
    }

    Ok(catalog)
}

/// Split comma-separated Site ID lists into one row per ID
///
/// `"1070,1071" -> "Karnes County"` becomes two rows. IDs are trimmed and
/// blank entries removed; the column is left as text.
pub fn explode_site_ids(sites: LazyFrame) -> LazyFrame {
    sites
        .with_column(
            col(columns::SITE_ID)
                .cast(DataType::String)
                .str()
                .split(lit(",")),
        )
        .explode(cols([columns::SITE_ID]))
        .with_column(col(columns::SITE_ID).str().strip_chars(lit(NULL)))
        .filter(col(columns::SITE_ID).neq(lit("")))
}

/// Convert the raw tab-delimited GeoTAMIS catalogs in `raw_dir` into structured CSVs in `out_dir`
pub fn convert_raw_catalogs(raw_dir: &Path, out_dir: &Path) -> Result<CatalogPaths> {
    let targets = CatalogPaths::from_reference_dir(out_dir);
    std::fs::create_dir_all(out_dir)?;

    for (kind, raw_name) in [
        (CatalogKind::Parameter, RAW_PARAMETER_CATALOG_FILE),
        (CatalogKind::Unit, RAW_UNIT_CATALOG_FILE),
        (CatalogKind::Site, RAW_SITE_CATALOG_FILE),
    ] {
        let raw_path = raw_dir.join(raw_name);
        let mut catalog = load_catalog(kind, &raw_path, b'\t')?;
        let target = targets.path(kind);
        write_csv(&mut catalog, target)?;

        info!(
            "Converted {} catalog {} -> {} ({} rows)",
            kind,
            raw_path.display(),
            target.display(),
            catalog.height()
        );
    }

    Ok(targets)
}
