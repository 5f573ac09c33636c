use dicom_core::value::Value;
use dicom_core::{Tag, VR};
use dicom_dictionary_std::tags;
use dicom_object::meta::FileMetaTableBuilder;
use dicom_object::mem::InMemElement;
use dicom_object::{FileDicomObject, FileMetaTable, InMemDicomObject};

use crate::dataset::Dataset;

pub(crate) const STUDY_UID: &str = "1.2.826.0.1.3680043.8.498.1001";
pub(crate) const SERIES_UID: &str = "1.2.826.0.1.3680043.8.498.2002";
pub(crate) const SOP_UID: &str = "1.2.826.0.1.3680043.8.498.3003";

pub(crate) fn make_file_meta() -> FileMetaTable {
    FileMetaTableBuilder::new()
        .media_storage_sop_class_uid("1.2.840.10008.5.1.4.1.1.2")
        .media_storage_sop_instance_uid(SOP_UID)
        .transfer_syntax("1.2.840.10008.1.2.1") // Explicit VR Little Endian
        .build()
        .unwrap()
}

fn elem(tag: Tag, vr: VR, value: &str) -> InMemElement {
    InMemElement::new(tag, vr, Value::from(value))
}

pub(crate) fn make_instance_elements() -> Vec<InMemElement> {
    vec![
        elem(tags::SOP_CLASS_UID, VR::UI, "1.2.840.10008.5.1.4.1.1.2"),
        elem(tags::SOP_INSTANCE_UID, VR::UI, SOP_UID),
        elem(tags::STUDY_DATE, VR::DA, "20230914"),
        elem(tags::STUDY_TIME, VR::TM, "101500"),
        elem(tags::MODALITY, VR::CS, "CT"),
        elem(tags::REFERRING_PHYSICIAN_NAME, VR::PN, "House^Gregory"),
        elem(tags::STUDY_DESCRIPTION, VR::LO, "Abdomen CT"),
        elem(tags::SERIES_DESCRIPTION, VR::LO, "PP 1mm"),
        elem(tags::PATIENT_NAME, VR::PN, "Doe^John"),
        elem(tags::PATIENT_ID, VR::LO, "PAT-001"),
        elem(tags::PATIENT_BIRTH_DATE, VR::DA, "19700101"),
        elem(tags::PATIENT_SEX, VR::CS, "M"),
        elem(tags::PATIENT_AGE, VR::AS, "053Y"),
        elem(tags::STUDY_INSTANCE_UID, VR::UI, STUDY_UID),
        elem(tags::SERIES_INSTANCE_UID, VR::UI, SERIES_UID),
        elem(tags::SERIES_NUMBER, VR::IS, "7"),
    ]
}

pub(crate) fn make_dataset() -> Dataset {
    Dataset::from_parts(make_file_meta(), make_instance_elements())
}

pub(crate) fn make_instance_bytes(elements: Vec<InMemElement>) -> Vec<u8> {
    let mut obj: FileDicomObject<InMemDicomObject> =
        FileDicomObject::new_empty_with_meta(make_file_meta());
    for elem in elements {
        obj.put(elem);
    }
    let mut bytes = Vec::new();
    obj.write_all(&mut bytes).unwrap();
    bytes
}
