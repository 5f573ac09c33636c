use anyhow::Result;
use clap::Parser;
use dicom_pseudonymization::cli::{init_logging, report_failure};
use dicom_pseudonymization::extractor::extract_patient_info;
use std::path::PathBuf;
use std::process::ExitCode;

/// Print the patient summary of a zipped DICOM study
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Uploaded study archive (zip)
    archive: PathBuf,

    /// Pseudonym of the study, names the scratch location
    token: String,

    /// Show more verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn run(args: Args) -> Result<String> {
    let record = extract_patient_info(&args.archive, &args.token)?;
    Ok(serde_json::to_string(&record)?)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => report_failure(&e),
    }
}
