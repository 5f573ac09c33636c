#![allow(dead_code)]

use dicom_core::value::Value;
use dicom_core::{Tag, VR};
use dicom_object::mem::InMemElement;
use dicom_object::meta::FileMetaTableBuilder;
use dicom_object::{FileDicomObject, InMemDicomObject};
use dicom_pseudonymization::tags;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const STUDY_UID: &str = "1.2.826.0.1.3680043.8.498.1001";

pub struct Instance {
    pub sop_instance_uid: String,
    pub series_instance_uid: String,
    pub series_number: Option<String>,
    pub series_description: Option<String>,
    pub patient_id: Option<String>,
}

impl Instance {
    pub fn new(sop_instance_uid: &str) -> Self {
        Self {
            sop_instance_uid: sop_instance_uid.into(),
            series_instance_uid: "1.2.826.0.1.3680043.8.498.2002".into(),
            series_number: Some("7".into()),
            series_description: Some("PP 1mm".into()),
            patient_id: Some("PAT-001".into()),
        }
    }

    pub fn series(mut self, uid: &str, number: &str, description: &str) -> Self {
        self.series_instance_uid = uid.into();
        self.series_number = Some(number.into());
        self.series_description = Some(description.into());
        self
    }

    pub fn without_patient_id(mut self) -> Self {
        self.patient_id = None;
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let meta = FileMetaTableBuilder::new()
            .media_storage_sop_class_uid("1.2.840.10008.5.1.4.1.1.2")
            .media_storage_sop_instance_uid(self.sop_instance_uid.as_str())
            .transfer_syntax("1.2.840.10008.1.2.1")
            .build()
            .unwrap();
        let mut obj: FileDicomObject<InMemDicomObject> =
            FileDicomObject::new_empty_with_meta(meta);

        let mut elements = vec![
            elem(tags::SOP_CLASS_UID, VR::UI, "1.2.840.10008.5.1.4.1.1.2"),
            elem(tags::SOP_INSTANCE_UID, VR::UI, &self.sop_instance_uid),
            elem(tags::STUDY_DATE, VR::DA, "20230914"),
            elem(tags::STUDY_TIME, VR::TM, "101500"),
            elem(tags::MODALITY, VR::CS, "CT"),
            elem(tags::REFERRING_PHYSICIAN_NAME, VR::PN, "House^Gregory"),
            elem(tags::STUDY_DESCRIPTION, VR::LO, "Abdomen CT"),
            elem(tags::PATIENT_NAME, VR::PN, "Doe^John"),
            elem(tags::PATIENT_BIRTH_DATE, VR::DA, "19700101"),
            elem(tags::PATIENT_SEX, VR::CS, "M"),
            elem(tags::PATIENT_AGE, VR::AS, "053Y"),
            elem(tags::STUDY_INSTANCE_UID, VR::UI, STUDY_UID),
            elem(tags::SERIES_INSTANCE_UID, VR::UI, &self.series_instance_uid),
            elem(Tag(0x0009, 0x0010), VR::LO, "ACME 1.0"),
            elem(Tag(0x0009, 0x1001), VR::LO, "vendor secret"),
        ];
        if let Some(patient_id) = &self.patient_id {
            elements.push(elem(tags::PATIENT_ID, VR::LO, patient_id));
        }
        if let Some(number) = &self.series_number {
            elements.push(elem(tags::SERIES_NUMBER, VR::IS, number));
        }
        if let Some(description) = &self.series_description {
            elements.push(elem(tags::SERIES_DESCRIPTION, VR::LO, description));
        }
        for elem in elements {
            obj.put(elem);
        }

        let mut bytes = Vec::new();
        obj.write_all(&mut bytes).unwrap();
        bytes
    }
}

/// Sandbox mimicking the upload layout: `<root>/temp/upload.zip`.
pub struct Sandbox {
    pub root: tempfile::TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("temp")).unwrap();
        Self { root }
    }

    pub fn root(&self) -> PathBuf {
        self.root.path().canonicalize().unwrap()
    }

    pub fn upload_path(&self) -> PathBuf {
        self.root.path().join("temp").join("upload.zip")
    }

    /// Writes a zip upload with the given `(entry name, content)` pairs.
    pub fn upload(&self, entries: &[(&str, Vec<u8>)]) -> PathBuf {
        let path = self.upload_path();
        write_zip(&path, entries);
        path
    }
}

fn elem(tag: Tag, vr: VR, value: &str) -> InMemElement {
    InMemElement::new(tag, vr, Value::from(value))
}

pub fn write_zip(path: &Path, entries: &[(&str, Vec<u8>)]) {
    let file = File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);
    for (name, content) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap();
}
