use dicom_core::header::Header;
use dicom_object::mem::InMemElement;

use crate::actions::Action;
use crate::dataset::Dataset;
use crate::processor::{process_dataset, Processor};
use crate::stages::{Stage, TransformError};

/// Parses a hex encoded tag group, with or without `0x` prefix (e.g. `"0x0002"`).
pub fn parse_group(group_id: &str) -> Result<u16, TransformError> {
    let trimmed = group_id.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() || digits.len() > 4 {
        return Err(TransformError::InvalidGroup(group_id.into()));
    }
    u16::from_str_radix(digits, 16).map_err(|_| TransformError::InvalidGroup(group_id.into()))
}

/// Removes every element of one tag group, leaving all other groups alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupFilter {
    group: u16,
}

impl GroupFilter {
    pub fn new(group: u16) -> Self {
        Self { group }
    }

    pub fn from_hex(group_id: &str) -> Result<Self, TransformError> {
        Ok(Self::new(parse_group(group_id)?))
    }

    pub fn apply(&self, dataset: Dataset) -> Result<Dataset, TransformError> {
        process_dataset(self, dataset).map_err(|e| TransformError::from_action(Stage::Filter, e))
    }
}

impl Processor for GroupFilter {
    fn action_for(&self, elem: &InMemElement) -> Action {
        if elem.tag().group() == self.group {
            Action::Remove
        } else {
            Action::Keep
        }
    }
}

/// Removes all elements of the hex encoded group `group_id` from the dataset.
pub fn filter(dataset: Dataset, group_id: &str) -> Result<Dataset, TransformError> {
    GroupFilter::from_hex(group_id)?.apply(dataset)
}

pub fn filter_group(dataset: Dataset, group: u16) -> Result<Dataset, TransformError> {
    GroupFilter::new(group).apply(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    use dicom_core::value::Value;
    use dicom_core::{Tag, VR};

    use crate::tags;
    use crate::test_utils::{make_file_meta, make_instance_elements};

    fn make_dataset_with_meta_elements() -> Dataset {
        let mut elements = make_instance_elements();
        elements.push(InMemElement::new(
            tags::TRANSFER_SYNTAX_UID,
            VR::UI,
            Value::from("1.2.840.10008.1.2.1"),
        ));
        elements.push(InMemElement::new(
            tags::MEDIA_STORAGE_SOP_INSTANCE_UID,
            VR::UI,
            Value::from("1.2.3.4"),
        ));
        elements.push(InMemElement::new(
            Tag(0x0019, 0x0010),
            VR::LO,
            Value::from("Referenced Instance UID"),
        ));
        Dataset::from_parts(make_file_meta(), elements)
    }

    #[test]
    fn test_parse_group() {
        assert_eq!(parse_group("0x0002"), Ok(0x0002));
        assert_eq!(parse_group("0X0010"), Ok(0x0010));
        assert_eq!(parse_group("7fe0"), Ok(0x7FE0));
        assert_eq!(parse_group(" 0x0019 "), Ok(0x0019));

        assert!(parse_group("").is_err());
        assert!(parse_group("0x").is_err());
        assert!(parse_group("0x10000").is_err());
        assert!(parse_group("0xZZ").is_err());
    }

    #[test]
    fn test_filter() {
        let dataset = make_dataset_with_meta_elements();
        let count_before = dataset.len();

        let filtered = filter(dataset, "0x0002").unwrap();
        assert_eq!(filtered.len(), count_before - 2);
        assert!(!filtered.contains(tags::TRANSFER_SYNTAX_UID));
        assert!(!filtered.contains(tags::MEDIA_STORAGE_SOP_INSTANCE_UID));

        // other groups are untouched, including the private block group
        assert!(filtered.contains(Tag(0x0019, 0x0010)));
        assert_eq!(filtered.string(tags::PATIENT_ID).as_deref(), Some("PAT-001"));
    }

    #[test]
    fn test_filter_is_idempotent() {
        let once = filter(make_dataset_with_meta_elements(), "0x0002").unwrap();
        let twice = filter(once.clone(), "0x0002").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_keeps_file_meta_table() {
        let filtered = filter_group(make_dataset_with_meta_elements(), 0x0002).unwrap();
        assert_eq!(filtered.meta(), &make_file_meta());
    }

    #[test]
    fn test_filter_invalid_group() {
        let result = filter(make_dataset_with_meta_elements(), "meta");
        assert_eq!(result, Err(TransformError::InvalidGroup("meta".into())));
    }
}
