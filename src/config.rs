use garde::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

static UID_ROOT_REGEX: OnceLock<Regex> = OnceLock::new();

const UID_ROOT_MAX_LENGTH: usize = 32;
pub const UID_ROOT_DEFAULT_VALUE: &str = "1.2.410.200108.1";
pub const PRIVATE_CREATOR_DEFAULT_VALUE: &str = "Referenced Instance UID";

/// The [`UidRoot`] is the organization root that replaces the leading characters of the
/// Study, Series and SOP Instance UIDs during pseudonymization.
///
/// The [`UidRoot`] must follow DICOM UID format rules:
/// - Start with a digit 1-9
/// - Contain only numbers and dots
///
/// It also must not have more than 32 characters.
///
/// The number of characters replaced in an original UID equals the length of the root, so
/// for the default root (`1.2.410.200108.1`) the first 16 characters are replaced.
///
/// # Example
///
/// ```
/// use dicom_pseudonymization::config::UidRoot;
///
/// let uid_root = "1.2.840.123".parse::<UidRoot>().unwrap();
/// assert_eq!(uid_root.len(), 11);
///
/// // Invalid UID root (not starting with 1-9)
/// let invalid = "0.1.2".parse::<UidRoot>();
/// assert!(invalid.is_err());
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
#[serde(try_from = "String", into = "String")]
pub struct UidRoot(String);

#[derive(Error, Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
#[error("{0} is not a valid UID root")]
pub struct UidRootError(String);

impl UidRoot {
    pub fn new(uid_root: &str) -> Result<Self, UidRootError> {
        let regex = UID_ROOT_REGEX.get_or_init(|| {
            Regex::new(&format!(
                r"^[1-9][0-9.]{{0,{}}}$",
                UID_ROOT_MAX_LENGTH - 1
            ))
            .unwrap()
        });

        if !regex.is_match(uid_root) {
            return Err(UidRootError(format!(
                "UID root must start with 1-9, contain only numbers and dots, and be no longer than {UID_ROOT_MAX_LENGTH} characters"
            )));
        }

        Ok(Self(uid_root.into()))
    }

    /// Number of characters of an original UID replaced by this root.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for UidRoot {
    fn default() -> Self {
        Self(UID_ROOT_DEFAULT_VALUE.into())
    }
}

impl FromStr for UidRoot {
    type Err = UidRootError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UidRoot::new(s)
    }
}

impl TryFrom<String> for UidRoot {
    type Error = UidRootError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        UidRoot::new(&value)
    }
}

impl From<UidRoot> for String {
    fn from(value: UidRoot) -> Self {
        value.0
    }
}

impl AsRef<str> for UidRoot {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Label registered as private creator for the block that keeps the original UIDs.
///
/// The label is stored as a LO value, so it must not be empty, must not contain a
/// backslash and can be at most 64 characters long.
#[derive(Serialize, Deserialize, Validate, Debug, Clone, Eq, PartialEq)]
#[serde(try_from = "String", into = "String")]
pub struct PrivateCreator(#[garde(length(min = 1, max = 64), pattern(r"^[^\\]*$"))] String);

#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[error("{0} is not a valid private creator")]
pub struct PrivateCreatorError(String);

impl PrivateCreator {
    pub fn new(label: &str) -> Result<Self, PrivateCreatorError> {
        let creator = Self(label.trim().into());
        creator
            .validate()
            .map_err(|report| PrivateCreatorError(format!("{label:?}: {report}")))?;
        Ok(creator)
    }
}

impl Default for PrivateCreator {
    fn default() -> Self {
        Self(PRIVATE_CREATOR_DEFAULT_VALUE.into())
    }
}

impl FromStr for PrivateCreator {
    type Err = PrivateCreatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrivateCreator::new(s)
    }
}

impl TryFrom<String> for PrivateCreator {
    type Error = PrivateCreatorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PrivateCreator::new(&value)
    }
}

impl From<PrivateCreator> for String {
    fn from(value: PrivateCreator) -> Self {
        value.0
    }
}

impl AsRef<str> for PrivateCreator {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ConfigError {
    #[error("invalid UID root: {0}")]
    InvalidUidRoot(String),

    #[error("invalid private creator: {0}")]
    InvalidPrivateCreator(String),

    #[error("could not read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("invalid config file {path}: {message}")]
    Parse { path: String, message: String },
}

impl From<UidRootError> for ConfigError {
    fn from(err: UidRootError) -> Self {
        ConfigError::InvalidUidRoot(err.0)
    }
}

impl From<PrivateCreatorError> for ConfigError {
    fn from(err: PrivateCreatorError) -> Self {
        ConfigError::InvalidPrivateCreator(err.0)
    }
}

fn default_remove_source_archive() -> bool {
    true
}

/// Configuration for DICOM pseudonymization.
///
/// # Fields
///
/// * `uid_root` - The [`UidRoot`] written over the start of every Study, Series and SOP
///   Instance UID
/// * `private_creator` - The [`PrivateCreator`] label of the private block holding the
///   original UIDs
/// * `remove_source_archive` - Whether the uploaded archive is deleted once a study was
///   pseudonymized
///
/// A configuration can be loaded from a JSON file, where every field is optional:
///
/// ```json
/// {
///   "uid_root": "1.2.410.200108.1",
///   "private_creator": "Referenced Instance UID",
///   "remove_source_archive": true
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    uid_root: UidRoot,

    #[serde(default)]
    private_creator: PrivateCreator,

    #[serde(default = "default_remove_source_archive")]
    remove_source_archive: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            uid_root: UidRoot::default(),
            private_creator: PrivateCreator::default(),
            remove_source_archive: default_remove_source_archive(),
        }
    }
}

impl Config {
    pub fn get_uid_root(&self) -> &UidRoot {
        &self.uid_root
    }

    pub fn get_private_creator(&self) -> &PrivateCreator {
        &self.private_creator
    }

    pub fn remove_source_archive(&self) -> bool {
        self.remove_source_archive
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Loads a [`Config`] from a JSON file, using defaults for any missing settings.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: format!("{e}"),
        })?;
        Self::from_json_str(&json).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: format!("{e}"),
        })
    }
}

/// A builder for [`Config`].
///
/// # Example
///
/// ```
/// use dicom_pseudonymization::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .uid_root("1.2.840.123".parse().unwrap())
///     .private_creator("Original UIDs".parse().unwrap())
///     .remove_source_archive(false)
///     .build();
/// assert_eq!(config.get_uid_root().as_ref(), "1.2.840.123");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigBuilder(Config);

impl ConfigBuilder {
    pub fn new() -> Self {
        ConfigBuilder(Config::default())
    }

    /// Starts from an existing [`Config`], e.g. one loaded from a file.
    pub fn from_config(config: Config) -> Self {
        ConfigBuilder(config)
    }

    pub fn uid_root(mut self, uid_root: UidRoot) -> Self {
        self.0.uid_root = uid_root;
        self
    }

    pub fn private_creator(mut self, private_creator: PrivateCreator) -> Self {
        self.0.private_creator = private_creator;
        self
    }

    /// Controls whether the uploaded archive is deleted after a successful run.
    ///
    /// The archive is never deleted when the run fails or finds no valid instances, so a
    /// failed run can always be repeated against the original upload.
    pub fn remove_source_archive(mut self, remove: bool) -> Self {
        self.0.remove_source_archive = remove;
        self
    }

    pub fn build(self) -> Config {
        self.0
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
