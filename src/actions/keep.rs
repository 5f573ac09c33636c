use dicom_object::mem::InMemElement;

use crate::actions::errors::ActionError;
use crate::actions::ProcessElement;

/// Action that passes DICOM elements through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Keep;

impl ProcessElement for Keep {
    fn process(&self, elem: InMemElement) -> Result<Option<InMemElement>, ActionError> {
        Ok(Some(elem))
    }
}
