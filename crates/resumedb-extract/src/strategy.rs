use resumedb_core::DocumentKind;

/// A single way of getting text out of a document.
///
/// Chains are plain lists of strategies tried in order until one yields
/// non-blank text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// In-process `pdf-extract`.
    PdfExtract,
    /// `pdftotext -layout`.
    Pdftotext,
    /// Paragraph walk over the `docx-rs` document model.
    DocxStructured,
    /// macOS `textutil`.
    Textutil,
    /// Word automation through PowerShell COM.
    WordAutomation,
    Antiword,
    Catdoc,
    /// Headless LibreOffice (`soffice`, `libreoffice`, `localc`).
    OfficeSuite,
    /// Raw text runs from the OOXML parts of the zip container.
    OoxmlXml,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PdfExtract => "pdf-extract",
            Self::Pdftotext => "pdftotext",
            Self::DocxStructured => "docx-structured",
            Self::Textutil => "textutil",
            Self::WordAutomation => "word-automation",
            Self::Antiword => "antiword",
            Self::Catdoc => "catdoc",
            Self::OfficeSuite => "office-suite",
            Self::OoxmlXml => "ooxml-xml",
        }
    }

    /// Whether this strategy can handle files of `kind`.
    pub fn applies_to(&self, kind: DocumentKind) -> bool {
        match self {
            Self::PdfExtract | Self::Pdftotext => kind == DocumentKind::Pdf,
            Self::DocxStructured => kind == DocumentKind::Docx,
            _ => kind != DocumentKind::Pdf,
        }
    }
}

pub fn pdf_chain() -> Vec<Strategy> {
    vec![Strategy::PdfExtract, Strategy::Pdftotext]
}

/// Word-document chain for the host identified by `os`
/// (a value of `std::env::consts::OS`).
pub fn word_chain(os: &str) -> Vec<Strategy> {
    let mut chain = vec![Strategy::DocxStructured];
    match os {
        "macos" => chain.push(Strategy::Textutil),
        "windows" => chain.push(Strategy::WordAutomation),
        _ => {}
    }
    chain.extend([
        Strategy::Antiword,
        Strategy::Catdoc,
        Strategy::OfficeSuite,
        Strategy::OoxmlXml,
    ]);
    chain
}

/// Default chain for `kind` on the current host.
pub fn default_chain(kind: DocumentKind) -> Vec<Strategy> {
    let chain = match kind {
        DocumentKind::Pdf => pdf_chain(),
        DocumentKind::Doc | DocumentKind::Docx => word_chain(std::env::consts::OS),
    };
    chain.into_iter().filter(|s| s.applies_to(kind)).collect()
}
