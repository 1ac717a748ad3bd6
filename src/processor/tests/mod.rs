//! Integration tests for the processor module
//!
//! Tests the complete pipeline using synthetic TAMIS reports and catalogs.

pub mod basic_processing;

use crate::config::TamisConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const REPORT_HEADER: &[&str] = &[
    "Transaction Type",
    "Action",
    "State Cd",
    "County Cd",
    "Site ID",
    "Parameter Cd",
    "POC",
    "Dur Cd",
    "Unit Cd",
    "Meth Cd",
    "Date",
    "Time",
    "Value",
    "Null Data Cd",
    "Col Freq",
    "Mon Protocol ID",
    "Qual Cd 1",
    "Qual Cd 2",
    "Qual Cd 3",
    "Qual Cd 4",
    "Qual Cd 5",
    "Qual Cd 6",
    "Qual Cd 7",
    "Qual Cd 8",
    "Qual Cd 9",
    "Qual Cd 10",
    "Alternate MDL",
    "Uncertainty Value",
];

/// One data row: (site, parameter, unit, date, time, value)
pub type Observation<'a> = (i64, i64, &'a str, &'a str, &'a str, &'a str);

/// The two-row Ethane scenario from Karnes County
pub const ETHANE: &[Observation<'static>] = &[
    (1070, 43202, "008", "20250407", "00:00", "55.055"),
    (1070, 43202, "008", "20250407", "03:00", "44.3327"),
];

/// Render a report with the standard preamble using `delimiter`
pub fn report_text(delimiter: char, observations: &[Observation<'_>]) -> String {
    let token = match delimiter {
        '\t' => "Tab".to_string(),
        other => other.to_string(),
    };
    let sep = delimiter.to_string();

    let mut text = format!(
        "AQS Raw Data (RD) Transaction Report, Version 1.6, 3/11/2011\n\
         Run By: TAMIS User\n\
         Run Date: 08/29/2025 16:58:22,  Run Time:      3.00 seconds\n\
         Fields Delimited by: {token}  Action: I  Caution!  This report does not use the pipe (|) delimiter required in AQS Transaction reports.\n\
         Measurements reported from: 04/07/2025 00:00:00 up to but not including: 04/22/2025 00:00:00\n\
         Sample Duration Code: 1  Report in AQS Units: N\n\
         Report only valid data: Y  Validation levels included (0,1,2,3): 3\n\
         Only allow AQS codes: N  Column headings included: Y\n\
         Report Missing Measurements: N  Check for Negative Measurements: N\n\
         Comment: \n"
    );
    text.push_str(&REPORT_HEADER.join(&sep));
    text.push('\n');

    for (site, parameter, unit, date, time, value) in observations {
        let mut fields = vec![
            "RD".to_string(),
            "I".to_string(),
            "48".to_string(),
            "255".to_string(),
            site.to_string(),
            parameter.to_string(),
            "01".to_string(),
            "1".to_string(),
            unit.to_string(),
            "128".to_string(),
            date.to_string(),
            time.to_string(),
            value.to_string(),
        ];
        fields.resize(REPORT_HEADER.len(), String::new());
        text.push_str(&fields.join(&sep));
        text.push('\n');
    }

    text
}

/// Write the three structured catalogs into `dir`
pub fn write_catalogs(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    fs::write(
        dir.join("tceq_parameters.csv"),
        "Parameter Cd,Parameter Name\n43202,Ethane\n43203,Ethylene\n44201,Ozone\n",
    )
    .unwrap();
    fs::write(
        dir.join("tceq_units.csv"),
        "Unit Cd,Unit Description,Unit Abbr,Unit Type\n\
         8,Parts per billion volume,ppbv,Concentration\n\
         7,Parts per billion,ppb,Concentration\n",
    )
    .unwrap();
    fs::write(
        dir.join("tceq_site_locations.csv"),
        "Site ID,Site Name\n\"1070,1071\",Karnes County\n1068,Floresville\n",
    )
    .unwrap();
}

/// A temp workspace holding catalogs and a config pointing at them
pub struct Fixture {
    pub temp_dir: TempDir,
    pub config: TamisConfig,
}

impl Fixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let reference_dir = temp_dir.path().join("ref_files");
        write_catalogs(&reference_dir);
        let config = TamisConfig::default().with_reference_dir(&reference_dir);

        Self { temp_dir, config }
    }

    /// Write a report file and return its path
    pub fn report(&self, name: &str, delimiter: char, observations: &[Observation<'_>]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, report_text(delimiter, observations)).unwrap();
        path
    }
}
