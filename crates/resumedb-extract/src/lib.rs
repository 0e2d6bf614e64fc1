//! Plain-text extraction from PDF and Word documents.
//!
//! Each format has an ordered chain of strategies. The first strategy that
//! produces non-blank text wins; when all fail the caller gets every reason.

mod command;
pub mod error;
mod ooxml;
pub mod strategy;

use std::path::Path;
use std::time::Duration;

use resumedb_core::DocumentKind;

pub use error::{Attempt, ExtractError, Result};
pub use strategy::{default_chain, pdf_chain, word_chain, Strategy};

pub const DEFAULT_OFFICE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct TextExtractor {
    office_timeout: Duration,
    strategies: Option<Vec<Strategy>>,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_OFFICE_TIMEOUT)
    }
}

impl TextExtractor {
    pub fn new(office_timeout: Duration) -> Self {
        Self { office_timeout, strategies: None }
    }

    /// Replace the host default chains with `strategies`. Entries that do
    /// not apply to a file's format are skipped for that file.
    pub fn with_strategies(mut self, strategies: Vec<Strategy>) -> Self {
        self.strategies = Some(strategies);
        self
    }

    fn chain_for(&self, kind: DocumentKind) -> Vec<Strategy> {
        match &self.strategies {
            Some(list) => list.iter().copied().filter(|s| s.applies_to(kind)).collect(),
            None => default_chain(kind),
        }
    }

    /// Extract the text of `path`, dispatching on its extension.
    pub async fn extract(&self, path: &Path) -> Result<String> {
        let kind = DocumentKind::from_path(path)
            .ok_or_else(|| ExtractError::UnsupportedFormat(path.display().to_string()))?;
        tokio::fs::metadata(path)
            .await
            .map_err(|source| ExtractError::Io { path: path.display().to_string(), source })?;

        let mut attempts = Vec::new();
        for strategy in self.chain_for(kind) {
            match self.run(strategy, path).await {
                Ok(text) if !text.trim().is_empty() => {
                    tracing::debug!(path = %path.display(), strategy = strategy.name(), "extracted text");
                    return Ok(text);
                }
                Ok(_) => {
                    tracing::debug!(path = %path.display(), strategy = strategy.name(), "no text");
                    attempts.push(Attempt { strategy, reason: "no text produced".into() });
                }
                Err(e) => {
                    tracing::debug!(path = %path.display(), strategy = strategy.name(), error = %e, "strategy failed");
                    attempts.push(Attempt { strategy, reason: format!("{e:#}") });
                }
            }
        }

        if std::env::consts::OS != "windows" {
            if let Some(verdict) = command::describe(path).await {
                tracing::warn!(path = %path.display(), file_type = %verdict, "all extraction strategies failed");
            }
        }
        Err(ExtractError::Exhausted { path: path.display().to_string(), attempts })
    }

    async fn run(&self, strategy: Strategy, path: &Path) -> anyhow::Result<String> {
        match strategy {
            Strategy::PdfExtract => {
                blocking(path, |p| pdf_extract::extract_text(p).map_err(|e| anyhow::anyhow!("{e}"))).await
            }
            Strategy::Pdftotext => command::pdftotext(path).await,
            Strategy::DocxStructured => blocking(path, ooxml::docx_paragraphs).await,
            Strategy::Textutil => command::textutil(path).await,
            Strategy::WordAutomation => command::word_automation(path).await,
            Strategy::Antiword => command::capture("antiword", [path]).await,
            Strategy::Catdoc => command::capture("catdoc", [path]).await,
            Strategy::OfficeSuite => command::office_suite(path, self.office_timeout).await,
            Strategy::OoxmlXml => blocking(path, ooxml::raw_parts).await,
        }
    }
}

/// Run a parsing library off the async runtime; a panic inside it becomes
/// an ordinary failure.
async fn blocking<F>(path: &Path, f: F) -> anyhow::Result<String>
where
    F: FnOnce(&Path) -> anyhow::Result<String> + Send + 'static,
{
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || f(&owned))
        .await
        .map_err(|e| anyhow::anyhow!("extractor panicked: {e}"))?
}
