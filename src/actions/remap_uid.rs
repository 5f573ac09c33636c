use dicom_core::header::Header;
use dicom_core::value::Value;
use dicom_object::mem::InMemElement;

use crate::actions::errors::ActionError;
use crate::actions::{is_empty_element, ProcessElement};
use crate::config::UidRoot;
use crate::dataset::trim_padding;

/// Action that moves a UID into the namespace of the configured [`UidRoot`].
///
/// The first `uid_root.len()` characters of the original UID are replaced by the root, every
/// character after that is copied unchanged. Because the suffix comes from the source system,
/// the remapped UID stays as unique as the original one.
///
/// Empty values are passed through. A UID shorter than the root cannot be remapped and
/// results in [`ActionError::UidTooShort`].
#[derive(Debug, Clone, PartialEq)]
pub struct RemapUid {
    uid_root: UidRoot,
}

impl RemapUid {
    pub fn new(uid_root: UidRoot) -> Self {
        Self { uid_root }
    }
}

impl ProcessElement for RemapUid {
    fn process(&self, elem: InMemElement) -> Result<Option<InMemElement>, ActionError> {
        if is_empty_element(&elem) {
            return Ok(Some(elem));
        }

        let original = trim_padding(elem.value().string()?);
        if original.is_empty() {
            return Ok(Some(elem));
        }

        let suffix = match original.get(self.uid_root.len()..) {
            Some(suffix) => suffix,
            None => {
                return Err(ActionError::UidTooShort {
                    tag: elem.tag(),
                    uid: original.to_string(),
                    root_len: self.uid_root.len(),
                })
            }
        };

        let remapped = format!("{}{}", self.uid_root.as_ref(), suffix);
        let new_elem = InMemElement::new(elem.tag(), elem.vr(), Value::from(remapped));
        Ok(Some(new_elem))
    }
}
