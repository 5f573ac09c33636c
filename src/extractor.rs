//! Read-only scan of an uploaded study for the identity of its patient.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::archive::{self, ArchiveError};
use crate::codec;
use crate::dataset::Dataset;
use crate::fs_ops;
use crate::pipeline::StudyLayout;
use crate::tags;
use crate::PipelineError;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("no instance with a patient ID found in {0}")]
    NotFound(String),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Layout(#[from] PipelineError),
}

impl ExtractError {
    /// Whether the failure is caused by the uploaded data itself rather than by the system.
    pub fn is_invalid_input(&self) -> bool {
        match self {
            ExtractError::NotFound(_) => true,
            ExtractError::Archive(ArchiveError::InvalidArchive { .. }) => true,
            ExtractError::Layout(e) => e.is_invalid_input(),
            _ => false,
        }
    }
}

/// Patient and study summary of an instance, printed as JSON with camelCase keys.
///
/// Every field is `None` when the instance does not carry a value for it.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    pub patient_id: Option<String>,
    pub patient_name: Option<String>,
    pub study_date: Option<String>,
    pub study_time: Option<String>,
    pub study_description: Option<String>,
    pub sex: Option<String>,
    pub age: Option<String>,
}

impl PatientRecord {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self {
            patient_id: dataset.string(tags::PATIENT_ID),
            patient_name: dataset.string(tags::PATIENT_NAME),
            study_date: dataset.string(tags::STUDY_DATE),
            study_time: dataset.string(tags::STUDY_TIME),
            study_description: dataset.string(tags::STUDY_DESCRIPTION),
            sex: dataset.string(tags::PATIENT_SEX),
            age: dataset.string(tags::PATIENT_AGE),
        }
    }

    pub fn is_identified(&self) -> bool {
        self.patient_id.is_some()
    }
}

fn read_record(path: &Path) -> Option<PatientRecord> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("skipping {}: {e}", path.display());
            return None;
        }
    };
    match codec::parse(&bytes) {
        Ok(dataset) => Some(PatientRecord::from_dataset(&dataset)),
        Err(e) => {
            debug!("skipping {}: {e}", path.display());
            None
        }
    }
}

/// Returns the record of the first candidate with a patient ID.
///
/// Candidates are consumed lazily: files after the first match are never opened. Unreadable
/// files and files without a patient ID are skipped.
pub fn first_identified_record<I>(candidates: I) -> Option<PatientRecord>
where
    I: IntoIterator<Item = PathBuf>,
{
    candidates
        .into_iter()
        .filter_map(|path| read_record(&path))
        .find(PatientRecord::is_identified)
}

/// Extracts `archive` into `scratch_dir` and returns the first identified patient record.
///
/// The scratch directory is always removed before returning, whatever the outcome.
pub fn extract_summary(archive: &Path, scratch_dir: &Path) -> Result<PatientRecord, ExtractError> {
    fs_ops::remove_dir_if_exists(scratch_dir).map_err(|source| ExtractError::Io {
        context: format!("failed to remove {}", scratch_dir.display()),
        source,
    })?;

    let result = scan(archive, scratch_dir);

    let cleanup = fs_ops::remove_dir_if_exists(scratch_dir).map_err(|source| ExtractError::Io {
        context: format!("failed to remove {}", scratch_dir.display()),
        source,
    });

    let record = result?;
    cleanup?;
    Ok(record)
}

fn scan(archive: &Path, scratch_dir: &Path) -> Result<PatientRecord, ExtractError> {
    let extracted = archive::extract(archive, scratch_dir)?;
    let record = first_identified_record(fs_ops::candidate_files(&extracted))
        .ok_or_else(|| ExtractError::NotFound(archive.display().to_string()))?;
    info!("found patient record in {}", archive.display());
    Ok(record)
}

/// Extracts the patient summary of an uploaded study, using the scratch location of `token`.
pub fn extract_patient_info(archive: &Path, token: &str) -> Result<PatientRecord, ExtractError> {
    let layout = StudyLayout::resolve(archive, token)?;
    extract_summary(archive, &layout.scratch_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    use dicom_core::value::Value;
    use dicom_core::VR;
    use dicom_object::mem::InMemElement;
    use std::cell::Cell;

    use crate::test_utils::{make_dataset, make_instance_bytes, make_instance_elements};

    fn write_instance(path: &Path, patient_id: Option<&str>) {
        let mut elements: Vec<InMemElement> = make_instance_elements()
            .into_iter()
            .filter(|e| e.header().tag != tags::PATIENT_ID)
            .collect();
        if let Some(patient_id) = patient_id {
            elements.push(InMemElement::new(
                tags::PATIENT_ID,
                VR::LO,
                Value::from(patient_id),
            ));
        }
        fs::write(path, make_instance_bytes(elements)).unwrap();
    }

    #[test]
    fn test_patient_record_from_dataset() {
        let record = PatientRecord::from_dataset(&make_dataset());
        assert_eq!(
            record,
            PatientRecord {
                patient_id: Some("PAT-001".into()),
                patient_name: Some("Doe^John".into()),
                study_date: Some("20230914".into()),
                study_time: Some("101500".into()),
                study_description: Some("Abdomen CT".into()),
                sex: Some("M".into()),
                age: Some("053Y".into()),
            }
        );
        assert!(record.is_identified());
    }

    #[test]
    fn test_patient_record_json() {
        let record = PatientRecord {
            patient_id: Some("PAT-001".into()),
            sex: Some("F".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"patientId":"PAT-001","patientName":null,"studyDate":null,"studyTime":null,"studyDescription":null,"sex":"F","age":null}"#
        );
    }

    #[test]
    fn test_first_identified_record_skips_until_match() {
        let dir = tempfile::tempdir().unwrap();
        let garbage = dir.path().join("a");
        let anonymous = dir.path().join("b");
        let identified = dir.path().join("c");
        let never_read = dir.path().join("d");
        fs::write(&garbage, b"not dicom").unwrap();
        write_instance(&anonymous, None);
        write_instance(&identified, Some("PAT-002"));
        write_instance(&never_read, Some("PAT-003"));

        let visited = Cell::new(0);
        let record = first_identified_record(
            [garbage, anonymous, identified, never_read]
                .into_iter()
                .inspect(|_| visited.set(visited.get() + 1)),
        )
        .unwrap();

        assert_eq!(record.patient_id.as_deref(), Some("PAT-002"));
        assert_eq!(visited.get(), 3);
    }

    #[test]
    fn test_first_identified_record_none() {
        let dir = tempfile::tempdir().unwrap();
        let anonymous = dir.path().join("a");
        write_instance(&anonymous, None);

        assert_eq!(first_identified_record([anonymous]), None);
        assert_eq!(first_identified_record(Vec::new()), None);
    }
}
