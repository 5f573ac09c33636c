//! Destination layout of transformed instances: `<base>/<series folder>/<SOP Instance UID>`.

use regex::Regex;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::dataset::Dataset;
use crate::tags;

static NON_ALPHANUMERIC_REGEX: OnceLock<Regex> = OnceLock::new();

const DEFAULT_SERIES_NUMBER: &str = "000";
const DEFAULT_SERIES_DESCRIPTION: &str = "unknown";
const UNKNOWN_INSTANCE: &str = "UNKNOWN";

/// Lower-cases the description and replaces every character outside `[a-z0-9]` with `_`.
///
/// ```
/// use dicom_pseudonymization::series::sanitize_description;
///
/// assert_eq!(sanitize_description("PP 1mm"), "pp_1mm");
/// assert_eq!(sanitize_description("T2 (FLAIR)"), "t2__flair_");
/// ```
pub fn sanitize_description(description: &str) -> String {
    let regex = NON_ALPHANUMERIC_REGEX.get_or_init(|| Regex::new(r"[^a-z0-9]").unwrap());
    regex
        .replace_all(&description.to_lowercase(), "_")
        .into_owned()
}

/// Keeps a raw value usable as a single path component.
fn path_component(value: Option<String>, default: &str) -> String {
    match value {
        Some(value) if value != "." && value != ".." => value.replace(['/', '\\'], "_"),
        _ => default.to_string(),
    }
}

/// Name of the folder grouping the instances of one series, `"{series number}_{description}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesFolder {
    series_number: String,
    description: String,
}

impl SeriesFolder {
    /// Missing (or empty) values fall back to `"000"` and `"unknown"`.
    pub fn new(series_number: Option<&str>, description: Option<&str>) -> Self {
        Self {
            series_number: path_component(
                series_number.map(str::trim).filter(|s| !s.is_empty()).map(String::from),
                DEFAULT_SERIES_NUMBER,
            ),
            description: description
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_SERIES_DESCRIPTION)
                .to_string(),
        }
    }

    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self::new(
            dataset.string(tags::SERIES_NUMBER).as_deref(),
            dataset.string(tags::SERIES_DESCRIPTION).as_deref(),
        )
    }
}

impl fmt::Display for SeriesFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}",
            self.series_number,
            sanitize_description(&self.description)
        )
    }
}

/// Where a transformed instance is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDestination {
    pub series_dir: PathBuf,
    pub instance_path: PathBuf,
}

impl InstanceDestination {
    pub fn new(base_dir: &Path, dataset: &Dataset) -> Self {
        let series_dir = base_dir.join(SeriesFolder::from_dataset(dataset).to_string());
        let instance_file =
            path_component(dataset.string(tags::SOP_INSTANCE_UID), UNKNOWN_INSTANCE);
        let instance_path = series_dir.join(instance_file);
        Self {
            series_dir,
            instance_path,
        }
    }
}

/// Computes the destination of `dataset` under `base_dir` and creates its series folder.
pub fn resolve_destination(base_dir: &Path, dataset: &Dataset) -> io::Result<InstanceDestination> {
    let destination = InstanceDestination::new(base_dir, dataset);
    fs::create_dir_all(&destination.series_dir)?;
    Ok(destination)
}
