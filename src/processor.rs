use dicom_core::header::Header;
use dicom_core::value::Value;
use dicom_core::Length;
use dicom_object::mem::InMemElement;
use dicom_object::InMemDicomObject;

use crate::actions::errors::ActionError;
use crate::actions::Action;
use crate::dataset::Dataset;

pub type Result<T, E = ActionError> = std::result::Result<T, E>;

/// Decides per data element which [`Action`] has to be applied to it.
///
/// Implementors are built for one dataset at a time, so any context they need (such as the
/// location of a reserved private block) is resolved up front and the rules themselves stay
/// a pure function of the element.
///
/// Only the element itself is handled by default. Processors that have to reach into sequence
/// items override [`Processor::process_element`] and hand the result to [`process_items`].
pub trait Processor {
    fn action_for(&self, elem: &InMemElement) -> Action;

    fn process_element(&self, elem: InMemElement) -> Result<Option<InMemElement>> {
        self.action_for(&elem).get_action_struct().process(elem)
    }
}

/// Runs every element of the dataset through the processor and assembles the result.
///
/// Elements are moved, not copied, so large values like pixel data are never duplicated.
pub fn process_dataset<P>(processor: &P, dataset: Dataset) -> Result<Dataset>
where
    P: Processor + ?Sized,
{
    let (meta, elements) = dataset.into_parts();

    let mut processed = Vec::new();
    for elem in elements {
        if let Some(new_elem) = processor.process_element(elem)? {
            processed.push(new_elem);
        }
    }

    Ok(Dataset::from_parts(meta, processed))
}

/// Runs the elements of every item of a sequence element through the processor.
///
/// The rebuilt sequence gets an undefined length, since items may have shrunk. Any other
/// element is returned unchanged.
pub fn process_items<P>(processor: &P, elem: InMemElement) -> Result<InMemElement>
where
    P: Processor + ?Sized,
{
    if elem.items().is_none() {
        return Ok(elem);
    }

    let tag = elem.tag();
    let vr = elem.vr();
    let items = elem.into_value().into_items().unwrap_or_default();

    let mut processed_items = Vec::with_capacity(items.len());
    for item in items {
        let mut processed = Vec::new();
        for nested in item {
            if let Some(new_elem) = processor.process_element(nested)? {
                processed.push(new_elem);
            }
        }
        processed_items.push(InMemDicomObject::from_element_iter(processed));
    }

    Ok(InMemElement::new(
        tag,
        vr,
        Value::new_sequence(processed_items, Length::UNDEFINED),
    ))
}
