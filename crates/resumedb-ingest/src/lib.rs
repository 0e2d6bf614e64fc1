//! Directory ingestion: enumerate, extract, chunk, store.
//!
//! Files are processed one at a time. A failure on one file is logged and
//! recorded in the report; the batch carries on with the next file.

use anyhow::{bail, Result};
use indicatif::ProgressBar;
use serde_json::Value;
use std::path::{Path, PathBuf};

use resumedb_core::{get_file_id, iterate_files, Metadata, RecursiveSplitter, StoreOutcome};
use resumedb_extract::TextExtractor;
use resumedb_vector::ResumeStore;

/// Metadata every freshly ingested chunk starts with.
pub fn baseline_metadata() -> Metadata {
    let mut meta = Metadata::new();
    meta.insert("archive".into(), Value::Bool(false));
    meta.insert("blocked".into(), Value::Bool(false));
    meta
}

#[derive(Debug, Clone)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct IngestReport {
    pub ingested: Vec<StoreOutcome>,
    pub failed: Vec<FailedFile>,
}

impl IngestReport {
    pub fn total_chunks(&self) -> usize {
        self.ingested.iter().map(|o| o.inserted).sum()
    }
}

pub struct Ingester {
    extractor: TextExtractor,
    splitter: RecursiveSplitter,
    store: ResumeStore,
}

impl Ingester {
    pub fn new(extractor: TextExtractor, splitter: RecursiveSplitter, store: ResumeStore) -> Self {
        Self { extractor, splitter, store }
    }

    pub fn store(&self) -> &ResumeStore {
        &self.store
    }

    pub async fn run(&self, root: &Path) -> Result<IngestReport> {
        self.run_with_progress(root, &ProgressBar::hidden()).await
    }

    /// Ingest every supported file directly under `root`.
    ///
    /// Only a failure to list `root` is returned as an error.
    pub async fn run_with_progress(&self, root: &Path, pb: &ProgressBar) -> Result<IngestReport> {
        let files = iterate_files(root)?;
        let mut report = IngestReport::default();

        for path in files {
            pb.set_message(path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default());
            match self.ingest_file(&path).await {
                Ok(outcome) => {
                    tracing::info!(path = %path.display(), chunks = outcome.inserted, "ingested");
                    report.ingested.push(outcome);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %format!("{e:#}"), "failed to ingest");
                    report.failed.push(FailedFile { path, error: format!("{e:#}") });
                }
            }
            pb.inc(1);
        }

        pb.finish_with_message(format!("{} ingested, {} failed", report.ingested.len(), report.failed.len()));
        Ok(report)
    }

    /// Run one file through the pipeline. A document with no usable text
    /// leaves whatever was stored for it untouched.
    pub async fn ingest_file(&self, path: &Path) -> Result<StoreOutcome> {
        let text = self.extractor.extract(path).await?;
        let chunks = self.splitter.split_text(&text);
        if chunks.is_empty() {
            bail!("no text chunks produced");
        }
        let file_id = get_file_id(path);
        self.store.store_chunks(&chunks, &file_id, &baseline_metadata()).await
    }
}
