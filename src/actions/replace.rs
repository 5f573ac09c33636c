use dicom_core::header::Header;
use dicom_core::value::Value;
use dicom_object::mem::InMemElement;

use crate::actions::errors::ActionError;
use crate::actions::ProcessElement;

/// Action that replaces DICOM element values with a fixed replacement value.
///
/// Used to substitute the patient identity with the pseudonym of the study.
#[derive(Debug, Clone, PartialEq)]
pub struct Replace {
    new_value: String,
}

impl Replace {
    pub fn new(new_value: String) -> Self {
        Self { new_value }
    }
}

impl ProcessElement for Replace {
    fn process(&self, elem: InMemElement) -> Result<Option<InMemElement>, ActionError> {
        let new_elem =
            InMemElement::new(elem.tag(), elem.vr(), Value::from(self.new_value.clone()));
        Ok(Some(new_elem))
    }
}
