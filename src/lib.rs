//! De-identification of DICOM studies.
//!
//! A study arrives as a zip archive of DICOM instances. Every instance is run through a fixed
//! sequence of transform stages (see [`stages`]):
//!
//! 1. the file meta group (`0x0002`) is stripped from the element set
//! 2. directly identifying elements are removed or emptied
//! 3. PatientID and PatientName are replaced by the study pseudonym
//! 4. the original Study, Series and SOP Instance UIDs are copied into a private block
//! 5. those UIDs are moved into a controlled UID root, keeping their unique suffix
//!
//! Transformed instances are written into one folder per series and the study is archived
//! again under its pseudonym. A separate, read-only [`extractor`] reports the patient
//! summary of an archive before it is pseudonymized.
//!
//! # Example
//!
//! ```no_run
//! use dicom_pseudonymization::config::ConfigBuilder;
//! use dicom_pseudonymization::pipeline::StudyPipeline;
//! use std::path::Path;
//!
//! let config = ConfigBuilder::default().build();
//! let mut pipeline = StudyPipeline::new(config);
//!
//! let result = pipeline
//!     .run(Path::new("uploads/tmp-1234.zip"), "token_123")
//!     .unwrap();
//! println!("{}", serde_json::to_string(&result).unwrap());
//! ```

pub mod actions;
pub mod archive;
pub mod cli;
pub mod codec;
pub mod config;
pub mod dataset;
pub mod extractor;
pub mod fs_ops;
pub mod pipeline;
pub mod processor;
pub mod series;
pub mod stages;

#[cfg(test)]
mod test_utils;

use std::io;
use thiserror::Error;

pub use dicom_core::{Tag, VR};
pub use dicom_dictionary_std::tags;

use archive::ArchiveError;
use codec::WriteError;
use stages::TransformError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no valid DICOM instances found in {0}")]
    NoValidData(String),

    #[error("invalid study token {0:?}")]
    InvalidToken(String),

    #[error("failed to transform {path}: {source}")]
    Transform {
        path: String,
        #[source]
        source: TransformError,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("failed to write {path}: {source}")]
    Serialize {
        path: String,
        #[source]
        source: WriteError,
    },
}

impl PipelineError {
    /// Whether the failure is caused by the uploaded data itself rather than by the system.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            PipelineError::NoValidData(_)
                | PipelineError::Archive(ArchiveError::InvalidArchive { .. })
        )
    }

    pub(crate) fn io(context: String) -> impl FnOnce(io::Error) -> PipelineError {
        move |source| PipelineError::Io { context, source }
    }
}
