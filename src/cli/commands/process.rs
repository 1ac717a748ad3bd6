//! Process command implementation
//!
//! Loads the reference catalogs once, runs every discovered report through
//! the pipeline and prints a summary. A failing report is logged and counted
//! without stopping the batch.

use super::shared::{
    create_progress_bar, discover_reports, ensure_distinct_outputs, setup_logging,
};
use crate::cli::args::ProcessArgs;
use crate::models::BatchStats;
use crate::processor::ReportProcessor;
use anyhow::{Context, Result, bail};
use colored::*;
use indicatif::HumanDuration;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Process command runner
pub fn run_process(args: ProcessArgs) -> Result<BatchStats> {
    let start_time = Instant::now();

    setup_logging(args.get_log_level(), args.quiet);
    info!("Starting TAMIS processor");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;
    let config = args.to_config()?;
    debug!("Resolved configuration: {:?}", config);

    let reports = discover_reports(&args.inputs)?;
    if reports.is_empty() {
        bail!("No reports found in the given inputs");
    }
    if let Some(output) = &config.output {
        ensure_distinct_outputs(&reports, output)?;
    }
    info!("Processing {} reports", reports.len());

    let processor = ReportProcessor::new(config).with_context(|| {
        "Failed to prepare the processor; run `tamis-processor convert-references` to build the catalogs"
    })?;

    let mut stats = BatchStats::default();
    let mut failures: Vec<(PathBuf, String)> = Vec::new();

    let progress = (args.show_progress() && reports.len() > 1)
        .then(|| create_progress_bar(reports.len() as u64, "Processing reports"));

    for report in &reports {
        match processor.process(report) {
            Ok(processed) => {
                stats.files_processed += 1;
                stats.total_rows += processed.stats.output_rows;
                if let Some(path) = processed.output_path {
                    stats.outputs.push(path);
                }
            }
            Err(e) => {
                error!("Failed to process {}: {}", report.display(), e);
                stats.files_failed += 1;
                failures.push((report.clone(), e.to_string()));
            }
        }

        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = &progress {
        pb.finish_with_message("Done");
    }

    stats.processing_time_ms = start_time.elapsed().as_millis();

    if !args.quiet {
        print_summary(&stats, &failures);
    }

    Ok(stats)
}

fn print_summary(stats: &BatchStats, failures: &[(PathBuf, String)]) {
    let duration = HumanDuration(Duration::from_millis(stats.processing_time_ms as u64));

    println!();
    println!("{}", "TAMIS Processing Complete".bright_green().bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   • Reports processed: {}", stats.files_processed);
    println!("   • Wide rows produced: {}", stats.total_rows);
    println!("   • Processing time: {}", duration);

    if !stats.outputs.is_empty() {
        println!();
        println!("{}", "Output Files:".bright_cyan());
        for path in &stats.outputs {
            println!("   • {}", path.display());
        }
    }

    if !failures.is_empty() {
        println!();
        println!(
            "{}",
            format!("Failed reports: {}", stats.files_failed)
                .bright_red()
                .bold()
        );
        for (path, reason) in failures {
            println!("   • {}: {}", path.display().to_string().bright_yellow(), reason);
        }
    }

    println!();
}
