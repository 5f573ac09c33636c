use dicom_core::value::CastValueError;
use dicom_core::Tag;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionError {
    #[error("Value error: {}", .0.to_lowercase())]
    ValueError(String),

    #[error("UID {uid} in {tag} is shorter than the {root_len} characters of the UID root")]
    UidTooShort {
        tag: Tag,
        uid: String,
        root_len: usize,
    },
}

impl From<CastValueError> for ActionError {
    fn from(err: CastValueError) -> Self {
        ActionError::ValueError(format!("{err}"))
    }
}
