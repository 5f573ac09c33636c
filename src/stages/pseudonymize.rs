use dicom_core::header::Header;
use dicom_core::value::Value;
use dicom_core::VR;
use dicom_object::mem::InMemElement;

use crate::actions::Action;
use crate::dataset::Dataset;
use crate::processor::{process_dataset, Processor};
use crate::stages::{Stage, TransformError};
use crate::tags;

/// Replaces PatientID and PatientName with the pseudonym of the study.
#[derive(Debug, Clone, PartialEq)]
pub struct Pseudonymizer<'a> {
    token: &'a str,
}

impl<'a> Pseudonymizer<'a> {
    pub fn new(token: &'a str) -> Self {
        Self { token }
    }
}

impl Processor for Pseudonymizer<'_> {
    fn action_for(&self, elem: &InMemElement) -> Action {
        let tag = elem.tag();
        if tag == tags::PATIENT_ID || tag == tags::PATIENT_NAME {
            Action::Replace(self.token.into())
        } else {
            Action::Keep
        }
    }
}

/// Sets PatientID and PatientName to `token`, adding the elements when the source lacks them.
pub fn pseudonymize(dataset: Dataset, token: &str) -> Result<Dataset, TransformError> {
    let pseudonymizer = Pseudonymizer::new(token);
    let mut dataset = process_dataset(&pseudonymizer, dataset)
        .map_err(|e| TransformError::from_action(Stage::Pseudonymize, e))?;

    for (tag, vr) in [(tags::PATIENT_ID, VR::LO), (tags::PATIENT_NAME, VR::PN)] {
        if !dataset.contains(tag) {
            dataset.put(InMemElement::new(tag, vr, Value::from(token)));
        }
    }

    Ok(dataset)
}
