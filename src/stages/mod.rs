//! The ordered de-identification transform applied to every instance of a study.
//!
//! Each stage is a function from [`Dataset`] to [`Dataset`]. [`Instance`] carries the stage an
//! instance has reached in its type, so the only way to obtain a remapped instance is to run
//! the stages in their fixed order:
//!
//! 1. strip the file meta group (`0x0002`)
//! 2. anonymize the header
//! 3. substitute the pseudonym
//! 4. copy the original UIDs into the reserved private block
//! 5. remap the UIDs into the configured root
//!
//! Any error in a stage is fatal for the run: a partially de-identified instance is never
//! written.

mod anonymize;
mod filter;
mod provenance;
mod pseudonymize;
mod remap;

use std::fmt;
use std::marker::PhantomData;

use dicom_core::Tag;
use thiserror::Error;

use crate::actions::errors::ActionError;
use crate::config::{Config, PrivateCreator, UidRoot};
use crate::dataset::{Dataset, FILE_META_GROUP};

pub use anonymize::{anonymize, HeaderAnonymizer, ItemAnonymizer};
pub use filter::{filter, filter_group, parse_group, GroupFilter};
pub use provenance::{preserve_provenance, PROVENANCE_GROUP, PROVENANCE_OFFSETS};
pub use pseudonymize::{pseudonymize, Pseudonymizer};
pub use remap::{remap_uids, UidRemapper, REMAPPED_UIDS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Filter,
    Anonymize,
    Pseudonymize,
    PreserveProvenance,
    RemapUids,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Filter => "tag group filter",
            Stage::Anonymize => "header anonymization",
            Stage::Pseudonymize => "pseudonymization",
            Stage::PreserveProvenance => "provenance preservation",
            Stage::RemapUids => "UID remapping",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("invalid tag group {0:?}")]
    InvalidGroup(String),

    #[error("value error during {stage}: {message}")]
    Value { stage: Stage, message: String },

    #[error("invalid UID {uid} in {tag}: {message}")]
    InvalidUid {
        tag: Tag,
        uid: String,
        message: String,
    },

    #[error("no free private creator slot left in group {group:04X}")]
    PrivateBlockFull { group: u16 },
}

impl TransformError {
    pub(crate) fn from_action(stage: Stage, err: ActionError) -> Self {
        match err {
            ActionError::ValueError(message) => TransformError::Value { stage, message },
            ActionError::UidTooShort { tag, uid, root_len } => TransformError::InvalidUid {
                tag,
                uid,
                message: format!("shorter than the {root_len} characters of the UID root"),
            },
        }
    }
}

/// Freshly parsed, nothing applied yet.
#[derive(Debug)]
pub enum Parsed {}

/// File meta group stripped.
#[derive(Debug)]
pub enum Filtered {}

/// Identifying header elements removed or emptied.
#[derive(Debug)]
pub enum Anonymized {}

/// Patient identity replaced by the pseudonym.
#[derive(Debug)]
pub enum Pseudonymized {}

/// Original UIDs copied into the private block.
#[derive(Debug)]
pub enum Preserved {}

/// UIDs moved into the configured root. Final stage.
#[derive(Debug)]
pub enum Remapped {}

/// A dataset together with the transform stage it has reached.
#[derive(Debug)]
pub struct Instance<S> {
    dataset: Dataset,
    stage: PhantomData<S>,
}

impl<S> Instance<S> {
    fn advance<T>(dataset: Dataset) -> Instance<T> {
        Instance {
            dataset,
            stage: PhantomData,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

impl Instance<Parsed> {
    pub fn new(dataset: Dataset) -> Self {
        Self::advance(dataset)
    }

    pub fn filter_file_meta(self) -> Result<Instance<Filtered>, TransformError> {
        let dataset = filter_group(self.dataset, FILE_META_GROUP)?;
        Ok(Self::advance(dataset))
    }
}

impl Instance<Filtered> {
    pub fn anonymize(
        self,
        private_creator: &PrivateCreator,
    ) -> Result<Instance<Anonymized>, TransformError> {
        let dataset = anonymize(self.dataset, private_creator)?;
        Ok(Self::advance(dataset))
    }
}

impl Instance<Anonymized> {
    pub fn pseudonymize(self, token: &str) -> Result<Instance<Pseudonymized>, TransformError> {
        let dataset = pseudonymize(self.dataset, token)?;
        Ok(Self::advance(dataset))
    }
}

impl Instance<Pseudonymized> {
    pub fn preserve_provenance(
        self,
        private_creator: &PrivateCreator,
    ) -> Result<Instance<Preserved>, TransformError> {
        let dataset = preserve_provenance(self.dataset, private_creator)?;
        Ok(Self::advance(dataset))
    }
}

impl Instance<Preserved> {
    pub fn remap_uids(self, uid_root: &UidRoot) -> Result<Instance<Remapped>, TransformError> {
        let dataset = remap_uids(self.dataset, uid_root)?;
        Ok(Self::advance(dataset))
    }
}

impl Instance<Remapped> {
    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }
}

/// Runs all transform stages on a parsed dataset, in their fixed order.
pub fn transform(
    dataset: Dataset,
    token: &str,
    config: &Config,
) -> Result<Dataset, TransformError> {
    let private_creator = config.get_private_creator();

    let instance = Instance::new(dataset)
        .filter_file_meta()?
        .anonymize(private_creator)?
        .pseudonymize(token)?
        .preserve_provenance(private_creator)?
        .remap_uids(config.get_uid_root())?;

    Ok(instance.into_dataset())
}
