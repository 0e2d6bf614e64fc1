use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use docx_rs::{Docx, Hyperlink, HyperlinkType, Paragraph, Run};
use resumedb_extract::{ExtractError, Strategy, TextExtractor};

fn write_docx(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut doc = Docx::new();
    for line in lines {
        doc = doc.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*line)));
    }
    let file = File::create(&path).unwrap();
    doc.build().pack(file).unwrap();
    path
}

fn in_process_only() -> TextExtractor {
    TextExtractor::default().with_strategies(vec![Strategy::DocxStructured, Strategy::OoxmlXml])
}

#[tokio::test]
async fn unsupported_extension_is_rejected_before_any_strategy() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("notes.txt");
    fs::write(&path, "plain text").unwrap();

    let err = TextExtractor::default().extract(&path).await.unwrap_err();
    assert!(matches!(err, ExtractError::UnsupportedFormat(_)), "got {err:?}");
}

#[tokio::test]
async fn missing_file_is_an_io_error() {
    let tmp = TempDir::new().unwrap();
    let err = TextExtractor::default().extract(&tmp.path().join("gone.docx")).await.unwrap_err();
    assert!(matches!(err, ExtractError::Io { .. }), "got {err:?}");
}

#[tokio::test]
async fn docx_paragraphs_are_joined_by_newlines() {
    let tmp = TempDir::new().unwrap();
    let path = write_docx(tmp.path(), "cv.docx", &["Jane Doe", "Senior Rust engineer"]);

    let text = TextExtractor::default().extract(&path).await.expect("docx text");
    assert!(text.contains("Jane Doe\nSenior Rust engineer"), "got {text:?}");
}

#[tokio::test]
async fn hyperlink_text_is_part_of_the_paragraph() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("contact.docx");
    let paragraph = Paragraph::new()
        .add_run(Run::new().add_text("Contact: "))
        .add_hyperlink(
            Hyperlink::new("mailto:jane@example.com", HyperlinkType::External)
                .add_run(Run::new().add_text("jane@example.com")),
        );
    Docx::new().add_paragraph(paragraph).build().pack(File::create(&path).unwrap()).unwrap();

    for strategy in [Strategy::DocxStructured, Strategy::OoxmlXml] {
        let text = TextExtractor::default()
            .with_strategies(vec![strategy])
            .extract(&path)
            .await
            .expect("contact text");
        assert!(text.contains("Contact: jane@example.com"), "{} returned {text:?}", strategy.name());
    }
}

#[tokio::test]
async fn raw_xml_fallback_reads_body_text() {
    let tmp = TempDir::new().unwrap();
    let path = write_docx(tmp.path(), "cv.docx", &["Jane Doe", "Senior Rust engineer"]);

    let text = TextExtractor::default()
        .with_strategies(vec![Strategy::OoxmlXml])
        .extract(&path)
        .await
        .expect("xml text");
    assert!(text.contains("Jane Doe\n\nSenior Rust engineer"), "got {text:?}");
}

#[tokio::test]
async fn ooxml_content_with_doc_extension_still_extracts() {
    let tmp = TempDir::new().unwrap();
    let docx = write_docx(tmp.path(), "cv.docx", &["Renamed resume"]);
    let doc = tmp.path().join("cv.doc");
    fs::rename(&docx, &doc).unwrap();

    let text = in_process_only().extract(&doc).await.expect("text");
    assert!(text.contains("Renamed resume"));
}

#[tokio::test]
async fn corrupt_document_exhausts_the_chain() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("broken.doc");
    fs::write(&path, b"\xd0\xcf\x11\xe0 not really a word file").unwrap();

    match in_process_only().extract(&path).await {
        Err(ExtractError::Exhausted { attempts, .. }) => {
            let tried: Vec<Strategy> = attempts.iter().map(|a| a.strategy).collect();
            assert_eq!(tried, vec![Strategy::OoxmlXml]);
            assert!(!attempts[0].reason.is_empty());
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
}

#[tokio::test]
async fn blank_document_counts_as_failure() {
    let tmp = TempDir::new().unwrap();
    let path = write_docx(tmp.path(), "empty.docx", &["   "]);

    match in_process_only().extract(&path).await {
        Err(ExtractError::Exhausted { attempts, .. }) => {
            assert_eq!(attempts.len(), 2);
            assert!(attempts.iter().all(|a| a.reason == "no text produced"));
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
}
