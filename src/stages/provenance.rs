use dicom_core::value::Value;
use dicom_core::{Tag, VR};
use dicom_object::mem::InMemElement;
use log::debug;

use crate::config::PrivateCreator;
use crate::dataset::Dataset;
use crate::stages::TransformError;
use crate::tags;

/// Private group holding the block with the original UIDs.
pub const PROVENANCE_GROUP: u16 = 0x0019;

/// Element offsets inside the reserved block, per original UID.
pub const PROVENANCE_OFFSETS: [(Tag, u16); 3] = [
    (tags::STUDY_INSTANCE_UID, 0x01),
    (tags::SERIES_INSTANCE_UID, 0x02),
    (tags::SOP_INSTANCE_UID, 0x03),
];

const FIRST_CREATOR_SLOT: u8 = 0x10;

/// Finds the block of `group` registered under `private_creator`.
///
/// Private creator elements live at `(gggg,0010)` to `(gggg,00FF)`; the low byte of the
/// creator tag is the block number, which becomes the high byte of the block's elements.
pub(crate) fn find_private_block(
    dataset: &Dataset,
    group: u16,
    private_creator: &PrivateCreator,
) -> Option<u8> {
    (FIRST_CREATOR_SLOT..=u8::MAX).find(|slot| {
        dataset.string(Tag(group, u16::from(*slot))).as_deref() == Some(private_creator.as_ref())
    })
}

fn free_creator_slot(dataset: &Dataset, group: u16) -> Option<u8> {
    (FIRST_CREATOR_SLOT..=u8::MAX).find(|slot| !dataset.contains(Tag(group, u16::from(*slot))))
}

fn block_tag(group: u16, slot: u8, offset: u16) -> Tag {
    Tag(group, (u16::from(slot) << 8) | offset)
}

/// Copies the current Study, Series and SOP Instance UIDs into the reserved private block.
///
/// Only UIDs with a value are copied, and a dataset without any of them is returned as is,
/// without registering a block. A block already registered under `private_creator` is reused
/// and its elements are replaced, so the block always holds the UIDs this dataset carries
/// before remapping.
pub fn preserve_provenance(
    mut dataset: Dataset,
    private_creator: &PrivateCreator,
) -> Result<Dataset, TransformError> {
    let originals: Vec<(u16, String)> = PROVENANCE_OFFSETS
        .iter()
        .filter_map(|(tag, offset)| dataset.string(*tag).map(|uid| (*offset, uid)))
        .collect();

    if originals.is_empty() {
        return Ok(dataset);
    }

    let slot = match find_private_block(&dataset, PROVENANCE_GROUP, private_creator) {
        Some(slot) => slot,
        None => {
            let slot = free_creator_slot(&dataset, PROVENANCE_GROUP).ok_or(
                TransformError::PrivateBlockFull {
                    group: PROVENANCE_GROUP,
                },
            )?;
            dataset.put(InMemElement::new(
                Tag(PROVENANCE_GROUP, u16::from(slot)),
                VR::LO,
                Value::from(private_creator.as_ref()),
            ));
            slot
        }
    };

    for (offset, uid) in originals {
        let tag = block_tag(PROVENANCE_GROUP, slot, offset);
        let elem = InMemElement::new(tag, VR::UI, Value::from(uid.as_str()));
        if let Some(previous) = dataset.put(elem) {
            if previous.to_str().ok().as_deref() != Some(uid.as_str()) {
                debug!("replaced stale original UID in {tag}");
            }
        }
    }

    Ok(dataset)
}
