use dicom_core::header::Header;
use dicom_core::{DataElement, PrimitiveValue};
use dicom_object::mem::InMemElement;

use crate::actions::errors::ActionError;
use crate::actions::ProcessElement;

/// Action that clears the value of DICOM elements while keeping the element itself.
///
/// The element stays in the dataset with its tag and VR, so the attribute remains present
/// but carries no information. Sequences lose all of their items.
#[derive(Debug, Clone, PartialEq)]
pub struct Empty;

impl ProcessElement for Empty {
    fn process(&self, elem: InMemElement) -> Result<Option<InMemElement>, ActionError> {
        let new_elem =
            DataElement::new::<PrimitiveValue>(elem.tag(), elem.vr(), PrimitiveValue::Empty);
        Ok(Some(new_elem))
    }
}
