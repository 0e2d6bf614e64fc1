//! Process wiring for the `resumedb` binary.
use anyhow::{bail, Result};
use lancedb::Connection;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use resumedb_core::{Config, Embedder, RecursiveSplitter, Settings};
use resumedb_extract::TextExtractor;
use resumedb_ingest::Ingester;
use resumedb_vector::{open_db, ResumeStore};

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

pub fn load_settings(config_path: Option<&Path>) -> Result<Settings> {
    let config = match config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config.settings()?)
}

/// Long-lived collaborators, built once at startup and handed out to
/// each command.
pub struct Services {
    pub settings: Settings,
    pub db: Connection,
    pub embedder: Arc<dyn Embedder>,
}

impl Services {
    /// Open the configured store. Only `create_store` callers may bring a
    /// missing store directory into existence; read-only commands fail instead.
    pub async fn from_settings(settings: Settings, create_store: bool) -> Result<Self> {
        let embedder = resumedb_embed::embedder_from_settings(&settings)?;
        if create_store {
            std::fs::create_dir_all(&settings.vector_db_path)?;
        } else if !settings.vector_db_path.is_dir() {
            bail!("vector store not found at {}; run `resumedb ingest` first", settings.vector_db_path.display());
        }
        let db = open_db(&settings.vector_db_path).await?;
        tracing::debug!(path = %settings.vector_db_path.display(), collection = %settings.collection, "opened vector store");
        Ok(Self { settings, db, embedder })
    }

    pub fn store(&self) -> ResumeStore {
        ResumeStore::new(self.db.clone(), &self.settings.collection, Arc::clone(&self.embedder))
    }

    pub fn ingester(&self) -> Result<Ingester> {
        let extractor = TextExtractor::new(Duration::from_secs(self.settings.office_timeout_secs));
        let splitter = RecursiveSplitter::new(self.settings.chunking())?;
        Ok(Ingester::new(extractor, splitter, self.store()))
    }
}

/// First `max` characters of `text` on one line.
pub fn preview(text: &str, max: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        return flat;
    }
    let cut: String = flat.chars().take(max).collect();
    format!("{cut}…")
}
