use clap::Parser;
use std::process;
use tamis_processor::cli::{args::Args, commands};

fn main() {
    let args = Args::parse();

    let Some(command) = args.command else {
        show_help_and_commands();
        process::exit(0);
    };

    match commands::run(command) {
        Ok(stats) if stats.files_failed > 0 => process::exit(2),
        Ok(_stats) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("TAMIS Processor - TCEQ Air-Quality Report Converter");
    println!("===================================================");
    println!();
    println!("Convert TAMIS/GeoTAMIS raw-data transaction reports into wide tables");
    println!("with one row per timestamp and site and one column per parameter.");
    println!();
    println!("USAGE:");
    println!("    tamis-processor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    process              Convert reports to CSV or Parquet (main command)");
    println!("    convert-references   Build the reference catalogs from raw exports");
    println!("    help                 Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Build the catalogs once from the raw TAMIS exports:");
    println!("    tamis-processor convert-references ./ref_files/raw");
    println!();
    println!("    # Convert a report, writing karnes.csv beside it:");
    println!("    tamis-processor process karnes.txt");
    println!();
    println!("    # Convert a folder of pipe or comma reports to Parquet in UTC-7:");
    println!("    tamis-processor process ./reports --tz-out Etc/GMT+7 --format parquet -o ./wide");
    println!();
    println!("For detailed help on any command, use:");
    println!("    tamis-processor <COMMAND> --help");
}
