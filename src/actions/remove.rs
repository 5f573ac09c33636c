use dicom_object::mem::InMemElement;

use crate::actions::errors::ActionError;
use crate::actions::ProcessElement;

/// Action that completely removes DICOM elements from the dataset.
///
/// This action eliminates the element entirely, returning `None` to indicate
/// that the element should not be present in the output.
#[derive(Debug, Clone, PartialEq)]
pub struct Remove;

impl ProcessElement for Remove {
    fn process(&self, _elem: InMemElement) -> Result<Option<InMemElement>, ActionError> {
        Ok(None)
    }
}
