//! Command implementations for the TAMIS processor CLI
//!
//! Each command lives in its own module:
//! - `process`: report processing with CSV or Parquet output
//! - `convert`: building the structured reference catalogs

pub mod convert;
pub mod process;
pub mod shared;

use crate::cli::args::Commands;
use crate::models::BatchStats;
use anyhow::Result;

/// Dispatch to the subcommand handler
pub fn run(command: Commands) -> Result<BatchStats> {
    match command {
        Commands::Process(process_args) => process::run_process(process_args),
        Commands::ConvertReferences(convert_args) => convert::run_convert(convert_args),
    }
}
