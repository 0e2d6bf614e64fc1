//! In-process readers for Word documents.

use anyhow::{anyhow, Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::Read;
use std::path::Path;

/// Paragraph text through the `docx-rs` model, one line per paragraph.
pub(crate) fn docx_paragraphs(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let doc = docx_rs::read_docx(&bytes).map_err(|e| anyhow!("not a readable docx: {e}"))?;

    let mut lines = Vec::new();
    for child in &doc.document.children {
        if let docx_rs::DocumentChild::Paragraph(p) = child {
            let mut line = String::new();
            paragraph_text(&p.children, &mut line);
            lines.push(line);
        }
    }
    Ok(lines.join("\n"))
}

/// Text of runs, including those nested in hyperlinks and tracked insertions.
fn paragraph_text(children: &[docx_rs::ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            docx_rs::ParagraphChild::Run(run) => run_text(run, out),
            docx_rs::ParagraphChild::Hyperlink(link) => paragraph_text(&link.children, out),
            docx_rs::ParagraphChild::Insert(ins) => {
                for ic in &ins.children {
                    if let docx_rs::InsertChild::Run(run) = ic {
                        run_text(run, out);
                    }
                }
            }
            _ => {}
        }
    }
}

fn run_text(run: &docx_rs::Run, out: &mut String) {
    for rc in &run.children {
        match rc {
            docx_rs::RunChild::Text(t) => out.push_str(&t.text),
            docx_rs::RunChild::Tab(_) => out.push('\t'),
            _ => {}
        }
    }
}

fn part_order(name: &str) -> Option<u8> {
    if !name.ends_with(".xml") {
        return None;
    }
    if name.starts_with("word/header") {
        Some(0)
    } else if name == "word/document.xml" {
        Some(1)
    } else if name.starts_with("word/footer") {
        Some(2)
    } else {
        None
    }
}

/// Text runs of the headers, body and footers, read straight from the zip.
pub(crate) fn raw_parts(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut archive = zip::ZipArchive::new(file).context("not a zip container")?;

    let mut parts: Vec<(u8, String)> = archive
        .file_names()
        .filter_map(|n| part_order(n).map(|o| (o, n.to_string())))
        .collect();
    parts.sort();
    if !parts.iter().any(|(o, _)| *o == 1) {
        return Err(anyhow!("word/document.xml missing"));
    }

    let mut text = String::new();
    for (_, name) in parts {
        let mut xml = String::new();
        archive
            .by_name(&name)
            .with_context(|| format!("failed to open {name}"))?
            .read_to_string(&mut xml)
            .with_context(|| format!("failed to read {name}"))?;
        text.push_str(&xml_text(&xml));
    }
    Ok(text)
}

/// Concatenate `w:t` runs. Paragraph ends become blank lines, breaks newlines.
pub(crate) fn xml_text(xml: &str) -> String {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::Text(e)) if in_text => {
                if let Ok(t) = e.unescape() {
                    out.push_str(&t);
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => out.push_str("\n\n"),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => out.push('\t'),
                b"br" | b"cr" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }
    out
}
