//! Glue shared by the `dcmpseudo` and `dcmpatient` binaries.

use clap::Args;
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::{Config, ConfigBuilder, ConfigError, PrivateCreator, UidRoot};
use crate::extractor::ExtractError;
use crate::PipelineError;

/// Exit status for uploads that do not contain usable DICOM data.
pub const EXIT_INVALID_INPUT: u8 = 9;

/// Exit status for every other failure.
pub const EXIT_FAILURE: u8 = 1;

pub const INVALID_INPUT_MESSAGE: &str = "Invalid DICOM";

/// Logs go to stderr as `"{Level}: {message}"`. `RUST_LOG` is honoured, `verbose` raises
/// the default filter from errors to info.
pub fn init_logging(verbose: bool) {
    let log_level = if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Error
    };

    let mut builder = Builder::from_default_env();
    builder
        .format(|buf, record| {
            let level = match record.level() {
                Level::Error => "Error",
                Level::Warn => "Warning",
                Level::Info => "Info",
                Level::Debug => "Debug",
                Level::Trace => "Trace",
            };
            writeln!(buf, "{}: {}", level, record.args())
        })
        .filter(None, log_level);
    builder.init();
}

/// Configuration options, applied on top of the defaults in this order: config file,
/// `--uid-root`, `--private-creator`.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// JSON configuration file
    #[arg(long, value_name = "FILE", env = "DCMPSEUDO_CONFIG")]
    pub config: Option<PathBuf>,

    /// UID root written over the start of the Study, Series and SOP Instance UIDs
    /// (default: '1.2.410.200108.1')
    #[arg(long, value_name = "UID_ROOT")]
    pub uid_root: Option<String>,

    /// Private creator label of the block holding the original UIDs
    /// (default: 'Referenced Instance UID')
    #[arg(long, value_name = "LABEL")]
    pub private_creator: Option<String>,
}

impl ConfigArgs {
    pub fn load(&self) -> Result<Config, ConfigError> {
        let mut config_builder = match &self.config {
            Some(path) => ConfigBuilder::from_config(Config::from_json_file(path)?),
            None => ConfigBuilder::default(),
        };

        if let Some(uid_root) = &self.uid_root {
            config_builder = config_builder.uid_root(uid_root.parse::<UidRoot>()?);
        }

        if let Some(private_creator) = &self.private_creator {
            config_builder =
                config_builder.private_creator(private_creator.parse::<PrivateCreator>()?);
        }

        Ok(config_builder.build())
    }
}

/// Whether an error chain reports unusable input rather than a system failure.
pub fn is_invalid_input(err: &anyhow::Error) -> bool {
    if let Some(e) = err.downcast_ref::<PipelineError>() {
        return e.is_invalid_input();
    }
    if let Some(e) = err.downcast_ref::<ExtractError>() {
        return e.is_invalid_input();
    }
    false
}

/// Writes the failure to stderr and returns the matching exit status.
pub fn report_failure(err: &anyhow::Error) -> ExitCode {
    if is_invalid_input(err) {
        eprintln!("{INVALID_INPUT_MESSAGE}");
        ExitCode::from(EXIT_INVALID_INPUT)
    } else {
        eprintln!("{err:#}");
        ExitCode::from(EXIT_FAILURE)
    }
}
