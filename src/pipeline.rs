//! Study level orchestration: extract, transform every instance, aggregate, archive.

use log::{debug, info, warn};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::{archive, codec, fs_ops, series, stages, PipelineError};

const SCRATCH_DIR_NAME: &str = "temp";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyState {
    Extracting,
    Transforming,
    Aggregating,
    Archiving,
    Done,
    Invalid,
    Failed,
}

impl fmt::Display for StudyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StudyState::Extracting => "extracting",
            StudyState::Transforming => "transforming",
            StudyState::Aggregating => "aggregating",
            StudyState::Archiving => "archiving",
            StudyState::Done => "done",
            StudyState::Invalid => "invalid",
            StudyState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful run.
///
/// Printed as `{"filePath": .., "seriesCount": .., "instancesCount": ..}`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StudyResult {
    pub file_path: PathBuf,
    pub series_count: usize,
    pub instances_count: usize,
}

/// Checks that a study token can be used as a single path component.
pub fn validate_token(token: &str) -> Result<(), PipelineError> {
    let is_valid = !token.trim().is_empty()
        && token != "."
        && token != ".."
        && !token.contains(['/', '\\', '\0']);

    if is_valid {
        Ok(())
    } else {
        Err(PipelineError::InvalidToken(token.into()))
    }
}

/// Locations used for one study, all derived from the uploaded archive and the study token.
///
/// For an upload at `<uploads>/tmp-1234.zip` and token `T`:
///
/// - storage: `<uploads>/../T`
/// - working tree: `<uploads>/../T/T`
/// - output archive: `<uploads>/../T/T.zip`
/// - extractor scratch: `<uploads>/../T/temp`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyLayout {
    pub storage_dir: PathBuf,
    pub working_dir: PathBuf,
    pub archive_path: PathBuf,
    pub scratch_dir: PathBuf,
}

impl StudyLayout {
    pub fn resolve(archive: &Path, token: &str) -> Result<Self, PipelineError> {
        validate_token(token)?;

        let upload_dir = match archive.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let upload_dir = upload_dir.canonicalize().map_err(PipelineError::io(format!(
            "failed to resolve {}",
            upload_dir.display()
        )))?;
        let root = upload_dir.parent().unwrap_or(&upload_dir);

        Ok(Self::new(root, token))
    }

    pub fn new(root: &Path, token: &str) -> Self {
        let storage_dir = root.join(token);
        Self {
            working_dir: storage_dir.join(token),
            archive_path: storage_dir.join(format!("{token}.zip")),
            scratch_dir: storage_dir.join(SCRATCH_DIR_NAME),
            storage_dir,
        }
    }
}

/// Drives one study through its states:
/// `Extracting → Transforming → Aggregating → Archiving → Done`.
///
/// A study without a single valid instance ends in `Invalid`; any other error ends in
/// `Failed`. In both cases the working tree is removed, no archive is produced and the
/// uploaded archive is left in place.
#[derive(Debug)]
pub struct StudyPipeline {
    config: Config,
    state: StudyState,
}

impl StudyPipeline {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: StudyState::Extracting,
        }
    }

    pub fn state(&self) -> StudyState {
        self.state
    }

    fn transition(&mut self, next: StudyState) {
        info!("study state: {} -> {}", self.state, next);
        self.state = next;
    }

    /// Pseudonymizes the study in `archive` under the pseudonym `token`.
    pub fn run(&mut self, archive: &Path, token: &str) -> Result<StudyResult, PipelineError> {
        self.state = StudyState::Extracting;
        let layout = match StudyLayout::resolve(archive, token) {
            Ok(layout) => layout,
            Err(e) => {
                self.transition(StudyState::Failed);
                return Err(e);
            }
        };

        match self.run_states(archive, token, &layout) {
            Ok(result) => {
                self.transition(StudyState::Done);
                Ok(result)
            }
            Err(e) => {
                let terminal = if matches!(e, PipelineError::NoValidData(_)) {
                    StudyState::Invalid
                } else {
                    StudyState::Failed
                };
                self.transition(terminal);
                if let Err(cleanup) = fs_ops::remove_dir_if_exists(&layout.working_dir) {
                    warn!(
                        "failed to remove {}: {cleanup}",
                        layout.working_dir.display()
                    );
                }
                Err(e)
            }
        }
    }

    fn run_states(
        &mut self,
        archive: &Path,
        token: &str,
        layout: &StudyLayout,
    ) -> Result<StudyResult, PipelineError> {
        let working_dir = &layout.working_dir;

        // leftovers of an interrupted run
        fs_ops::remove_dir_if_exists(working_dir).map_err(PipelineError::io(format!(
            "failed to remove {}",
            working_dir.display()
        )))?;
        archive::extract(archive, working_dir)?;

        self.transition(StudyState::Transforming);
        // Snapshot first so instances written during this pass are never picked up again.
        let candidates: Vec<PathBuf> = fs_ops::candidate_files(working_dir).collect();
        let mut transformed = 0;
        for path in &candidates {
            if self.transform_file(path, token, working_dir)? {
                transformed += 1;
            }
        }
        info!(
            "transformed {transformed} of {} files",
            candidates.len()
        );
        fs_ops::prune_empty_dirs(working_dir).map_err(PipelineError::io(format!(
            "failed to clean up {}",
            working_dir.display()
        )))?;

        self.transition(StudyState::Aggregating);
        let instances_count = fs_ops::count_files(working_dir).map_err(PipelineError::io(
            format!("failed to count instances in {}", working_dir.display()),
        ))?;
        if instances_count == 0 {
            return Err(PipelineError::NoValidData(archive.display().to_string()));
        }
        let series_count = fs_ops::count_series_dirs(working_dir).map_err(PipelineError::io(
            format!("failed to count series in {}", working_dir.display()),
        ))?;

        self.transition(StudyState::Archiving);
        let file_path = archive::create(working_dir, &layout.archive_path)?;
        fs_ops::remove_dir_if_exists(working_dir).map_err(PipelineError::io(format!(
            "failed to remove {}",
            working_dir.display()
        )))?;

        if self.config.remove_source_archive() {
            fs_ops::remove_file_if_exists(archive).map_err(PipelineError::io(format!(
                "failed to remove {}",
                archive.display()
            )))?;
        }

        Ok(StudyResult {
            file_path,
            series_count,
            instances_count,
        })
    }

    /// Transforms one extracted file in place. Returns `false` when the file was not a DICOM
    /// instance and has been discarded.
    fn transform_file(
        &self,
        path: &Path,
        token: &str,
        base_dir: &Path,
    ) -> Result<bool, PipelineError> {
        let bytes = fs::read(path)
            .map_err(PipelineError::io(format!("failed to read {}", path.display())))?;

        let dataset = match codec::parse(&bytes) {
            Ok(dataset) => dataset,
            Err(e) => {
                warn!("skipping {}: {e}", path.display());
                fs_ops::remove_file_if_exists(path).map_err(PipelineError::io(format!(
                    "failed to remove {}",
                    path.display()
                )))?;
                return Ok(false);
            }
        };

        let dataset = stages::transform(dataset, token, &self.config).map_err(|source| {
            PipelineError::Transform {
                path: path.display().to_string(),
                source,
            }
        })?;

        let destination = series::resolve_destination(base_dir, &dataset).map_err(
            PipelineError::io(format!("failed to create series folder for {}", path.display())),
        )?;
        let encoded = codec::serialize(&dataset).map_err(|source| PipelineError::Serialize {
            path: destination.instance_path.display().to_string(),
            source,
        })?;
        if destination.instance_path != path && destination.instance_path.exists() {
            warn!(
                "{} overwrites {}: both instances resolve to the same SOP Instance UID",
                path.display(),
                destination.instance_path.display()
            );
        }
        fs::write(&destination.instance_path, encoded).map_err(PipelineError::io(format!(
            "failed to write {}",
            destination.instance_path.display()
        )))?;
        debug!(
            "{} -> {}",
            path.display(),
            destination.instance_path.display()
        );

        if destination.instance_path != path {
            fs_ops::remove_file_if_exists(path).map_err(PipelineError::io(format!(
                "failed to remove {}",
                path.display()
            )))?;
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_token() {
        assert!(validate_token("token_123").is_ok());
        assert!(validate_token("HU-2023-0001").is_ok());

        assert!(validate_token("").is_err());
        assert!(validate_token("  ").is_err());
        assert!(validate_token(".").is_err());
        assert!(validate_token("..").is_err());
        assert!(validate_token("a/b").is_err());
        assert!(validate_token("a\\b").is_err());
    }

    #[test]
    fn test_study_layout() {
        let layout = StudyLayout::new(Path::new("/data/dicom"), "token_123");
        assert_eq!(layout.storage_dir, Path::new("/data/dicom/token_123"));
        assert_eq!(layout.working_dir, Path::new("/data/dicom/token_123/token_123"));
        assert_eq!(
            layout.archive_path,
            Path::new("/data/dicom/token_123/token_123.zip")
        );
        assert_eq!(layout.scratch_dir, Path::new("/data/dicom/token_123/temp"));
    }

    #[test]
    fn test_study_layout_resolve() {
        let root = tempfile::tempdir().unwrap();
        let uploads = root.path().join("temp");
        fs::create_dir_all(&uploads).unwrap();

        let layout = StudyLayout::resolve(&uploads.join("tmp-1.zip"), "token_123").unwrap();
        let root = root.path().canonicalize().unwrap();
        assert_eq!(layout, StudyLayout::new(&root, "token_123"));
    }

    #[test]
    fn test_study_layout_resolve_invalid_token() {
        let result = StudyLayout::resolve(Path::new("upload.zip"), "../etc");
        assert!(matches!(result, Err(PipelineError::InvalidToken(_))));
    }

    #[test]
    fn test_study_result_json() {
        let result = StudyResult {
            file_path: PathBuf::from("/data/dicom/token_123/token_123.zip"),
            series_count: 2,
            instances_count: 10,
        };
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"filePath":"/data/dicom/token_123/token_123.zip","seriesCount":2,"instancesCount":10}"#
        );
    }

    #[test]
    fn test_run_missing_archive_fails() {
        let root = tempfile::tempdir().unwrap();
        let uploads = root.path().join("temp");
        fs::create_dir_all(&uploads).unwrap();

        let mut pipeline = StudyPipeline::new(Config::default());
        let result = pipeline.run(&uploads.join("missing.zip"), "token_123");

        assert!(matches!(result, Err(PipelineError::Archive(_))));
        assert_eq!(pipeline.state(), StudyState::Failed);
        assert!(!root.path().join("token_123/token_123").exists());
    }
}
