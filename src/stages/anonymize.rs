use dicom_core::header::Header;
use dicom_core::Tag;
use dicom_object::mem::InMemElement;

use crate::actions::errors::ActionError;
use crate::actions::Action;
use crate::config::PrivateCreator;
use crate::dataset::{is_private_tag, Dataset, ElementKind, PATIENT_GROUP};
use crate::processor::{process_dataset, process_items, Processor};
use crate::stages::provenance::{find_private_block, PROVENANCE_GROUP};
use crate::stages::{Stage, TransformError};
use crate::tags;

/// Removes or empties the directly identifying elements of a dataset.
///
/// Rules, first match wins:
/// - StudyDate and StudyTime are removed
/// - private elements (odd group) are removed, except the reserved provenance block
/// - every element of the patient group (`0x0010`) is emptied
/// - every Person Name element, in any group, is emptied
/// - everything else is kept
///
/// Kept sequences are walked down to their deepest items, see [`ItemAnonymizer`].
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderAnonymizer {
    reserved_block: Option<u8>,
}

impl HeaderAnonymizer {
    /// Builds the anonymizer for one dataset, locating the provenance block registered by
    /// `private_creator` if the dataset already carries one.
    pub fn new(dataset: &Dataset, private_creator: &PrivateCreator) -> Self {
        Self {
            reserved_block: find_private_block(dataset, PROVENANCE_GROUP, private_creator),
        }
    }

    fn is_reserved(&self, tag: Tag) -> bool {
        match self.reserved_block {
            Some(slot) if tag.group() == PROVENANCE_GROUP => {
                let slot = u16::from(slot);
                tag.element() == slot || tag.element() >> 8 == slot
            }
            _ => false,
        }
    }
}

impl Processor for HeaderAnonymizer {
    fn action_for(&self, elem: &InMemElement) -> Action {
        let tag = elem.tag();

        if tag == tags::STUDY_DATE || tag == tags::STUDY_TIME {
            return Action::Remove;
        }

        if is_private_tag(&tag) {
            return if self.is_reserved(tag) {
                Action::Keep
            } else {
                Action::Remove
            };
        }

        if tag.group() == PATIENT_GROUP {
            return Action::Empty;
        }

        ItemAnonymizer.action_for(elem)
    }

    fn process_element(&self, elem: InMemElement) -> Result<Option<InMemElement>, ActionError> {
        let processed = self.action_for(&elem).get_action_struct().process(elem)?;
        processed
            .map(|elem| process_items(&ItemAnonymizer, elem))
            .transpose()
    }
}

/// Rules for the elements inside sequence items, at any depth.
///
/// Private elements are removed and Person Name elements emptied. The reserved provenance
/// block only exists at the top level, so no private element survives inside an item.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ItemAnonymizer;

impl Processor for ItemAnonymizer {
    fn action_for(&self, elem: &InMemElement) -> Action {
        if is_private_tag(&elem.tag()) {
            return Action::Remove;
        }

        match ElementKind::of(elem) {
            ElementKind::PersonName => Action::Empty,
            ElementKind::UniqueIdentifier | ElementKind::Other => Action::Keep,
        }
    }

    fn process_element(&self, elem: InMemElement) -> Result<Option<InMemElement>, ActionError> {
        let processed = self.action_for(&elem).get_action_struct().process(elem)?;
        processed.map(|elem| process_items(self, elem)).transpose()
    }
}

pub fn anonymize(
    dataset: Dataset,
    private_creator: &PrivateCreator,
) -> Result<Dataset, TransformError> {
    let anonymizer = HeaderAnonymizer::new(&dataset, private_creator);
    process_dataset(&anonymizer, dataset)
        .map_err(|e| TransformError::from_action(Stage::Anonymize, e))
}
