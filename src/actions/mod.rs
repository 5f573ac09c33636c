mod empty;
pub mod errors;
mod keep;
mod remap_uid;
mod remove;
mod replace;

use dicom_core::value::Value;
use dicom_core::PrimitiveValue;
use dicom_object::mem::InMemElement;
use empty::Empty;
use keep::Keep;
use remap_uid::RemapUid;
use remove::Remove;
use replace::Replace;

use crate::config::UidRoot;
use errors::ActionError;

pub trait ProcessElement {
    /// Takes ownership of an element and returns its replacement, or `None` when the
    /// element has to be dropped from the dataset.
    fn process(&self, elem: InMemElement) -> Result<Option<InMemElement>, ActionError>;
}

/// Specifies the action to perform on DICOM data elements during processing.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Clear the value of the data element.
    Empty,

    /// Preserve the original data element value without modification.
    Keep,

    /// Replace the leading characters of a UID with the given root, keeping its suffix.
    RemapUid(UidRoot),

    /// Completely remove the data element from the DICOM dataset.
    Remove,

    /// Replace the data element value with the specified string.
    Replace(String),
}

impl Action {
    pub fn get_action_struct(&self) -> Box<dyn ProcessElement> {
        match self {
            Action::Empty => Box::new(Empty),
            Action::Keep => Box::new(Keep),
            Action::RemapUid(uid_root) => Box::new(RemapUid::new(uid_root.clone())),
            Action::Remove => Box::new(Remove),
            Action::Replace(new_value) => Box::new(Replace::new(new_value.clone())),
        }
    }
}

pub(crate) fn is_empty_element(elem: &InMemElement) -> bool {
    elem.value() == &Value::Primitive(PrimitiveValue::Empty)
}
