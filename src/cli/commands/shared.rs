//! Shared components for CLI commands
//!
//! Logging setup, report discovery and progress reporting used by the
//! command implementations.

use crate::config::OutputConfig;
use crate::constants::REPORT_EXTENSION;
use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Set up structured logging on stderr
pub fn setup_logging(log_level: &str, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tamis_processor={}", log_level)));

    if quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

/// Expand report files, directories and glob patterns into a sorted list of reports
///
/// Directories are walked recursively and contribute their `.txt` files.
/// Explicitly named files are taken as given.
pub fn discover_reports(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut reports = Vec::new();

    for input in inputs {
        let path = Path::new(input);

        if path.is_file() {
            reports.push(path.to_path_buf());
        } else if path.is_dir() {
            reports.extend(reports_in_directory(path));
        } else if is_glob_pattern(input) {
            let matches = glob::glob(input)
                .with_context(|| format!("Invalid glob pattern '{}'", input))?;
            let before = reports.len();
            for entry in matches {
                match entry {
                    Ok(found) if found.is_file() => reports.push(found),
                    Ok(_) => {}
                    Err(e) => warn!("Skipping unreadable glob match: {}", e),
                }
            }
            if reports.len() == before {
                warn!("Pattern '{}' matched no reports", input);
            }
        } else {
            bail!("Input does not exist: {}", input);
        }
    }

    reports.sort();
    reports.dedup();

    debug!("Discovered {} reports", reports.len());
    Ok(reports)
}

fn reports_in_directory(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file() && has_report_extension(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

fn has_report_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(REPORT_EXTENSION))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

/// Fail when two reports would be saved to the same output file
///
/// Collecting a recursive discovery into one `--output-dir` maps reports by
/// file stem, so `april/karnes.txt` and `may/karnes.txt` would overwrite each
/// other.
pub fn ensure_distinct_outputs(reports: &[PathBuf], output: &OutputConfig) -> Result<()> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::with_capacity(reports.len());

    for report in reports {
        let target = output.output_path_for(report);
        if let Some(first) = claimed.get(&target) {
            bail!(
                "{} and {} would both be saved to {}; process them separately or drop --output-dir",
                first.display(),
                report.display(),
                target.display()
            );
        }
        claimed.insert(target, report);
    }

    Ok(())
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(message.to_string());
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_reports_in_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("april");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp_dir.path().join("b.txt"), "").unwrap();
        fs::write(nested.join("a.TXT"), "").unwrap();
        fs::write(temp_dir.path().join("b.csv"), "").unwrap();

        let reports =
            discover_reports(&[temp_dir.path().to_string_lossy().into_owned()]).unwrap();

        assert_eq!(reports, vec![nested.join("a.TXT"), temp_dir.path().join("b.txt")]);
    }

    #[test]
    fn test_discover_reports_glob_and_dedup() {
        let temp_dir = TempDir::new().unwrap();
        let report = temp_dir.path().join("karnes.txt");
        fs::write(&report, "").unwrap();
        let pattern = temp_dir.path().join("*.txt").to_string_lossy().into_owned();

        let reports =
            discover_reports(&[pattern, report.to_string_lossy().into_owned()]).unwrap();

        assert_eq!(reports, vec![report]);
    }

    #[test]
    fn test_explicit_file_keeps_any_extension() {
        let temp_dir = TempDir::new().unwrap();
        let report = temp_dir.path().join("export.dat");
        fs::write(&report, "").unwrap();

        let reports = discover_reports(&[report.to_string_lossy().into_owned()]).unwrap();

        assert_eq!(reports, vec![report]);
    }

    #[test]
    fn test_same_stem_reports_collide_in_output_dir() {
        let temp_dir = TempDir::new().unwrap();
        let april = temp_dir.path().join("april");
        let may = temp_dir.path().join("may");
        fs::create_dir_all(&april).unwrap();
        fs::create_dir_all(&may).unwrap();
        fs::write(april.join("karnes.txt"), "").unwrap();
        fs::write(may.join("karnes.txt"), "").unwrap();
        let reports =
            discover_reports(&[temp_dir.path().to_string_lossy().into_owned()]).unwrap();

        let collected = OutputConfig {
            directory: Some(temp_dir.path().join("wide")),
            ..Default::default()
        };
        let err = ensure_distinct_outputs(&reports, &collected).unwrap_err();
        assert!(err.to_string().contains("karnes.csv"));

        assert!(ensure_distinct_outputs(&reports, &OutputConfig::default()).is_ok());
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("gone.txt");

        assert!(discover_reports(&[missing.to_string_lossy().into_owned()]).is_err());
    }
}
