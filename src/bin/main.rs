use anyhow::{Context, Result};
use clap::Parser;
use dicom_pseudonymization::cli::{init_logging, report_failure, ConfigArgs};
use dicom_pseudonymization::pipeline::StudyPipeline;
use std::path::PathBuf;
use std::process::ExitCode;

/// Pseudonymize a zipped DICOM study
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Uploaded study archive (zip)
    archive: PathBuf,

    /// Pseudonym replacing the patient identity, also names the output archive
    token: String,

    #[command(flatten)]
    config: ConfigArgs,

    /// Show more verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn run(args: Args) -> Result<String> {
    let config = args.config.load().context("invalid configuration")?;

    let mut pipeline = StudyPipeline::new(config);
    let result = pipeline.run(&args.archive, &args.token)?;

    Ok(serde_json::to_string(&result)?)
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
