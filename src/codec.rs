//! Reading and writing of raw DICOM instances.

use dicom_dictionary_std::{tags, StandardDataDictionary};
use dicom_object::meta::FileMetaTableBuilder;
use dicom_object::{FileDicomObject, OpenFileOptions};
use thiserror::Error;

use crate::dataset::{trim_padding, Dataset};

const PREAMBLE_LENGTH: usize = 128;
const MAGIC_CODE: &[u8; 4] = b"DICM";

/// The input is not a DICOM instance that can be read.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("not a readable DICOM instance: {0}")]
pub struct ParseError(String);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WriteError {
    #[error("could not build file meta group: {0}")]
    Meta(String),

    #[error("could not encode DICOM instance: {0}")]
    Encode(String),
}

/// Parses a DICOM Part 10 instance, with or without the 128 byte preamble.
pub fn parse(bytes: &[u8]) -> Result<Dataset, ParseError> {
    let src = if has_preamble(bytes) {
        &bytes[PREAMBLE_LENGTH..]
    } else {
        bytes
    };

    let obj = OpenFileOptions::new()
        .from_reader(src)
        .map_err(|e| ParseError(format!("{e}")))?;
    Ok(Dataset::from_file_object(obj))
}

fn has_preamble(bytes: &[u8]) -> bool {
    bytes.len() >= PREAMBLE_LENGTH + MAGIC_CODE.len()
        && &bytes[PREAMBLE_LENGTH..PREAMBLE_LENGTH + MAGIC_CODE.len()] == MAGIC_CODE
}

/// Encodes a dataset as a DICOM Part 10 instance.
///
/// The file meta group is rebuilt from the original one: the transfer syntax and SOP class
/// are carried over, while the media storage SOP instance UID follows the (possibly remapped)
/// SOP Instance UID of the dataset.
pub fn serialize(dataset: &Dataset) -> Result<Vec<u8>, WriteError> {
    let meta = dataset.meta();
    let sop_instance_uid = dataset
        .string(tags::SOP_INSTANCE_UID)
        .unwrap_or_else(|| trim_padding(&meta.media_storage_sop_instance_uid).to_string());

    let file_meta = FileMetaTableBuilder::new()
        .transfer_syntax(trim_padding(meta.transfer_syntax()))
        .media_storage_sop_class_uid(trim_padding(&meta.media_storage_sop_class_uid))
        .media_storage_sop_instance_uid(sop_instance_uid)
        .build()
        .map_err(|e| WriteError::Meta(format!("{e}")))?;

    let mut obj = FileDicomObject::new_empty_with_dict_and_meta(StandardDataDictionary, file_meta);
    for elem in dataset.iter() {
        obj.put(elem.clone());
    }

    let mut bytes = Vec::new();
    obj.write_all(&mut bytes)
        .map_err(|e| WriteError::Encode(format!("{e}")))?;
    Ok(bytes)
}
