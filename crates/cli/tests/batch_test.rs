//! Batch driver tests writing into a temporary directory

use certificate::{CertificateComposer, StyleConfiguration};
use certmint_cli::{assign_ids, parse_rows, run_batch, BatchOptions};
use lopdf::dictionary;
use pretty_assertions::assert_eq;

fn create_template() -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let contents_id = doc.add_object(lopdf::Stream::new(dictionary! {}, Vec::new()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), lopdf::Object::from(842), lopdf::Object::from(595)],
        "Resources" => dictionary! {},
        "Contents" => contents_id,
    });
    doc.objects.insert(
        pages_id,
        lopdf::Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => 1,
            "Kids" => vec![lopdf::Object::Reference(page_id)],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

const ROWS: &str = r#"[
    { "Name": "Aarav Patel", "Course": "Rust 101", "IssueDate": "2026-01-15" },
    { "Name": "สมชาย", "Course": "Rust 101", "IssueDate": "2026-01-15" },
    { "Name": "Mei Lin", "Course": "" }
]"#;

#[test]
fn test_batch_writes_pdfs_and_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let records = assign_ids(parse_rows(ROWS).unwrap()).unwrap();
    let options = BatchOptions {
        out_dir: dir.path().join("out"),
        base_address: Some("https://certs.example.org".to_string()),
    };

    let manifest = run_batch(
        &CertificateComposer::default(),
        &create_template(),
        &records,
        None,
        &options,
    )
    .unwrap();

    // The unencodable name fails alone
    assert_eq!(manifest.issued.len(), 2);
    assert_eq!(manifest.failed.len(), 1);
    assert_eq!(manifest.failed[0].certificate_id, records[1].certificate_id.to_string());
    assert!(manifest.failed[0].error.contains("failed at fields"));

    for issued in &manifest.issued {
        let path = options.out_dir.join(&issued.file);
        let bytes = std::fs::read(&path).unwrap();
        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        assert_eq!(issued.file, format!("{}.pdf", issued.certificate_id));
    }
    assert_eq!(manifest.issued[1].name, "Mei Lin");
    assert_eq!(manifest.issued[1].course, "Unknown");
    assert_eq!(manifest.issued[1].issue_date, "Unknown");

    let written: serde_json::Value =
        serde_json::from_slice(&std::fs::read(options.out_dir.join("manifest.json")).unwrap())
            .unwrap();
    assert_eq!(written["issued"].as_array().unwrap().len(), 2);
    assert_eq!(
        written["failed"][0]["certificateId"],
        records[1].certificate_id.to_string()
    );
    assert!(!options
        .out_dir
        .join(format!("{}.pdf", records[1].certificate_id))
        .exists());
}

#[test]
fn test_batch_with_style_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let rows = parse_rows(
        r#"[{ "name": "Aarav Patel", "course": "Rust 101", "issuedate": "2026-01-15" }]"#,
    )
    .unwrap();
    let records = assign_ids(rows).unwrap();
    let style = StyleConfiguration::from_json(
        r##"{
            "name": { "enabled": true, "x": 50, "y": 40, "fontSize": 32, "colorHex": "#000000" },
            "course": { "enabled": true, "x": 50, "y": 52, "fontSize": 20, "colorHex": "#333333" },
            "date": { "enabled": true, "x": 50, "y": 60, "fontSize": 14, "colorHex": "#000000" },
            "qrCode": { "enabled": true, "x": 88, "y": 82, "scale": 0.75 }
        }"##,
    )
    .unwrap();
    let options = BatchOptions {
        out_dir: dir.path().to_path_buf(),
        base_address: None,
    };

    let manifest = run_batch(
        &CertificateComposer::default(),
        &create_template(),
        &records,
        Some(&style),
        &options,
    )
    .unwrap();

    assert!(manifest.failed.is_empty());
    let bytes = std::fs::read(dir.path().join(&manifest.issued[0].file)).unwrap();
    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    let page_id = doc.get_pages()[&1];
    let content = String::from_utf8(doc.get_page_content(page_id).unwrap()).unwrap();

    // 595 - 0.4 * 595
    assert!(content.contains(&format!(" {} Td\n", 595.0 - (40.0 / 100.0) * 595.0)));
    assert!(content.contains("/Im1 Do"));
}

#[test]
fn test_bad_template_fails_every_record_without_aborting() {
    let dir = tempfile::tempdir().unwrap();
    let records = assign_ids(parse_rows(ROWS).unwrap()).unwrap();
    let options = BatchOptions {
        out_dir: dir.path().to_path_buf(),
        base_address: None,
    };

    let manifest = run_batch(
        &CertificateComposer::default(),
        b"not a pdf",
        &records,
        None,
        &options,
    )
    .unwrap();

    assert!(manifest.issued.is_empty());
    assert_eq!(manifest.failed.len(), 3);
    assert!(manifest
        .failed
        .iter()
        .all(|failed| failed.error.contains("failed at load")));
}
