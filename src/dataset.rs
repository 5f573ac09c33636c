use dicom_core::header::Header;
use dicom_core::{Tag, VR};
use dicom_object::mem::InMemElement;
use dicom_object::{DefaultDicomObject, FileMetaTable, InMemDicomObject};

/// Tag group of the file meta information (transfer syntax and friends).
pub const FILE_META_GROUP: u16 = 0x0002;

/// Tag group holding the patient identity module.
pub const PATIENT_GROUP: u16 = 0x0010;

/// How an element is treated by the transform stages, derived from its value representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    PersonName,
    UniqueIdentifier,
    Other,
}

impl ElementKind {
    pub fn of(elem: &InMemElement) -> Self {
        Self::from_vr(elem.vr())
    }

    pub fn from_vr(vr: VR) -> Self {
        match vr {
            VR::PN => ElementKind::PersonName,
            VR::UI => ElementKind::UniqueIdentifier,
            _ => ElementKind::Other,
        }
    }
}

/// Returns `true` for tags following the private (odd group number) convention.
pub fn is_private_tag(tag: &Tag) -> bool {
    tag.group() % 2 != 0
}

/// The metadata of a single imaging instance.
///
/// The file meta table (group `0x0002`) describing the transfer encoding is kept apart from
/// the main element set. Any group `0x0002` elements that ended up inside the main element set
/// are regular elements here and can be filtered like any other group.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    meta: FileMetaTable,
    elements: InMemDicomObject,
}

impl Dataset {
    pub fn new(meta: FileMetaTable, elements: InMemDicomObject) -> Self {
        Self { meta, elements }
    }

    pub fn from_parts<I>(meta: FileMetaTable, elements: I) -> Self
    where
        I: IntoIterator<Item = InMemElement>,
    {
        Self::new(meta, InMemDicomObject::from_element_iter(elements))
    }

    pub fn from_file_object(obj: DefaultDicomObject) -> Self {
        let meta = obj.meta().clone();
        Self::new(meta, obj.into_inner())
    }

    pub fn into_parts(self) -> (FileMetaTable, InMemDicomObject) {
        (self.meta, self.elements)
    }

    pub fn meta(&self) -> &FileMetaTable {
        &self.meta
    }

    pub fn iter(&self) -> impl Iterator<Item = &InMemElement> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn element(&self, tag: Tag) -> Option<&InMemElement> {
        self.elements.element(tag).ok()
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.element(tag).is_some()
    }

    /// Returns the trimmed textual value of an element.
    ///
    /// Missing elements, values that cannot be represented as text and values that are empty
    /// after trimming the DICOM padding are all reported as `None`.
    pub fn string(&self, tag: Tag) -> Option<String> {
        let value = self.element(tag)?.to_str().ok()?;
        let trimmed = trim_padding(&value);
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    pub fn put(&mut self, elem: InMemElement) -> Option<InMemElement> {
        self.elements.put(elem)
    }

    pub fn remove(&mut self, tag: Tag) -> bool {
        self.elements.remove_element(tag)
    }
}

pub(crate) fn trim_padding(value: &str) -> &str {
    value.trim_matches(|c: char| c == '\0' || c.is_whitespace())
}
