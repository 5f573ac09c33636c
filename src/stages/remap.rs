use dicom_core::header::Header;
use dicom_core::Tag;
use dicom_object::mem::InMemElement;

use crate::actions::Action;
use crate::config::UidRoot;
use crate::dataset::Dataset;
use crate::processor::{process_dataset, Processor};
use crate::stages::{Stage, TransformError};
use crate::tags;

/// The UIDs moved into the configured root.
pub const REMAPPED_UIDS: [Tag; 3] = [
    tags::STUDY_INSTANCE_UID,
    tags::SERIES_INSTANCE_UID,
    tags::SOP_INSTANCE_UID,
];

#[derive(Debug, Clone, PartialEq)]
pub struct UidRemapper<'a> {
    uid_root: &'a UidRoot,
}

impl<'a> UidRemapper<'a> {
    pub fn new(uid_root: &'a UidRoot) -> Self {
        Self { uid_root }
    }
}

impl Processor for UidRemapper<'_> {
    fn action_for(&self, elem: &InMemElement) -> Action {
        if REMAPPED_UIDS.contains(&elem.tag()) {
            Action::RemapUid(self.uid_root.clone())
        } else {
            Action::Keep
        }
    }
}

/// Rewrites the Study, Series and SOP Instance UIDs so they start with `uid_root`.
///
/// Missing UIDs stay missing.
pub fn remap_uids(dataset: Dataset, uid_root: &UidRoot) -> Result<Dataset, TransformError> {
    let remapper = UidRemapper::new(uid_root);
    process_dataset(&remapper, dataset)
        .map_err(|e| TransformError::from_action(Stage::RemapUids, e))
}
