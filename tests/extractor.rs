mod common;

use common::{Instance, Sandbox};
use dicom_pseudonymization::extractor::{extract_patient_info, extract_summary, ExtractError};

#[test]
fn test_extract_patient_info() {
    let sandbox = Sandbox::new();
    let upload = sandbox.upload(&[(
        "a.dcm",
        Instance::new("1.2.826.0.1.3680043.8.498.3001").to_bytes(),
    )]);

    let record = extract_patient_info(&upload, "token_123").unwrap();
    assert_eq!(record.patient_id.as_deref(), Some("PAT-001"));
    assert_eq!(record.patient_name.as_deref(), Some("Doe^John"));
    assert_eq!(record.study_date.as_deref(), Some("20230914"));
    assert_eq!(record.study_time.as_deref(), Some("101500"));
    assert_eq!(record.study_description.as_deref(), Some("Abdomen CT"));
    assert_eq!(record.sex.as_deref(), Some("M"));
    assert_eq!(record.age.as_deref(), Some("053Y"));

    // the scratch folder is removed, the upload stays
    assert!(!sandbox.root().join("token_123/temp").exists());
    assert!(upload.exists());
}

#[test]
fn test_extract_only_second_file_identified() {
    let sandbox = Sandbox::new();
    let mut second = Instance::new("1.2.826.0.1.3680043.8.498.3002");
    second.patient_id = Some("PAT-002".into());
    let upload = sandbox.upload(&[
        (
            "a.dcm",
            Instance::new("1.2.826.0.1.3680043.8.498.3001")
                .without_patient_id()
                .to_bytes(),
        ),
        ("b.dcm", second.to_bytes()),
    ]);

    let record = extract_patient_info(&upload, "token_123").unwrap();
    assert_eq!(record.patient_id.as_deref(), Some("PAT-002"));
}

#[test]
fn test_extract_not_found() {
    let sandbox = Sandbox::new();
    let upload = sandbox.upload(&[
        ("notes.txt", b"no DICOM here".to_vec()),
        (
            "a.dcm",
            Instance::new("1.2.826.0.1.3680043.8.498.3001")
                .without_patient_id()
                .to_bytes(),
        ),
    ]);

    let scratch = sandbox.root().join("scratch");
    let err = extract_summary(&upload, &scratch).unwrap_err();

    assert!(matches!(err, ExtractError::NotFound(_)));
    assert!(err.is_invalid_input());
    assert!(!scratch.exists());
}

#[test]
fn test_extract_invalid_archive() {
    let sandbox = Sandbox::new();
    let upload = sandbox.upload_path();
    std::fs::write(&upload, b"not a zip archive").unwrap();

    let scratch = sandbox.root().join("scratch");
    let err = extract_summary(&upload, &scratch).unwrap_err();

    assert!(err.is_invalid_input());
    assert!(!scratch.exists());
}
