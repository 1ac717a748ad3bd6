//! Convert-references command implementation

use super::shared::setup_logging;
use crate::cli::args::ConvertArgs;
use crate::config::CatalogPaths;
use crate::models::{BatchStats, CatalogKind};
use crate::reference::convert_raw_catalogs;
use anyhow::{Context, Result};
use colored::*;
use std::time::Instant;
use tracing::info;

/// Rewrite the raw tab-delimited catalogs as the structured CSV catalogs
pub fn run_convert(args: ConvertArgs) -> Result<BatchStats> {
    let start_time = Instant::now();
    setup_logging(args.get_log_level(), false);

    let out_dir = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => {
            let default = CatalogPaths::default_location()?;
            default
                .parameters
                .parent()
                .map(|dir| dir.to_path_buf())
                .context("Default catalog location has no parent directory")?
        }
    };

    info!(
        "Converting raw catalogs from {} into {}",
        args.raw_dir.display(),
        out_dir.display()
    );
    let catalogs = convert_raw_catalogs(&args.raw_dir, &out_dir).with_context(|| {
        format!(
            "Failed to convert raw catalogs in {}",
            args.raw_dir.display()
        )
    })?;

    let outputs: Vec<_> = [CatalogKind::Parameter, CatalogKind::Unit, CatalogKind::Site]
        .into_iter()
        .map(|kind| catalogs.path(kind).to_path_buf())
        .collect();

    println!("{}", "Reference catalogs written:".bright_green().bold());
    for path in &outputs {
        println!("   • {}", path.display());
    }

    Ok(BatchStats {
        files_processed: outputs.len(),
        outputs,
        processing_time_ms: start_time.elapsed().as_millis(),
        ..Default::default()
    })
}
