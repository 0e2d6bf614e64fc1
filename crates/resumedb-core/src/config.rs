//! Layered configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! on top of the defaults in [`Settings`]. Relative paths are resolved against
//! the directory holding the config file.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::chunking::ChunkingConfig;
use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Typed view of every recognised configuration key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Ingestion root.
    pub data_directory: PathBuf,
    /// LanceDB directory. `chromadb_path` is accepted for older config files.
    #[serde(alias = "chromadb_path")]
    pub vector_db_path: PathBuf,
    pub collection: String,
    pub embedding_model: String,
    pub embedding_url: String,
    pub embedding_timeout_secs: u64,
    pub use_fake_embeddings: bool,
    pub fake_embedding_dim: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub chunk_separators: Vec<String>,
    pub top_k: usize,
    pub office_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let chunking = ChunkingConfig::default();
        Self {
            data_directory: PathBuf::from("data"),
            vector_db_path: PathBuf::from("vector_db"),
            collection: "resumes".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            embedding_url: "http://localhost:11434".to_string(),
            embedding_timeout_secs: 120,
            use_fake_embeddings: false,
            fake_embedding_dim: 768,
            chunk_size: chunking.chunk_size,
            chunk_overlap: chunking.chunk_overlap,
            chunk_separators: chunking.separators,
            top_k: 50,
            office_timeout_secs: 30,
        }
    }
}

impl Settings {
    pub fn chunking(&self) -> ChunkingConfig {
        ChunkingConfig {
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            separators: self.chunk_separators.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.chunking().validate()?;
        if self.top_k == 0 {
            return Err(Error::InvalidConfig("top_k must be at least 1".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(Error::InvalidConfig("collection must not be empty".into()));
        }
        if self.use_fake_embeddings && self.fake_embedding_dim == 0 {
            return Err(Error::InvalidConfig("fake_embedding_dim must be at least 1".into()));
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
}

impl Config {
    /// Load `config.toml` from the working directory. A missing file is not an
    /// error; defaults and `APP_*` variables still apply.
    pub fn load() -> Result<Self> {
        Self::build(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Load an explicit config file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::NotFound(format!("config file {}", path.display())));
        }
        Self::build(path)
    }

    fn build(path: &Path) -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file(path));
        if let Some(overlay) = env_overlay(path, &env_name) {
            figment = figment.merge(Toml::file(overlay));
        }
        figment = figment.merge(Env::prefixed("APP_"));

        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let config = Self { figment, base_dir };
        config.settings()?;
        Ok(config)
    }

    /// Extract, resolve and validate the typed settings.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.data_directory =
            resolve_with_base(&self.base_dir, settings.data_directory.to_string_lossy());
        settings.vector_db_path =
            resolve_with_base(&self.base_dir, settings.vector_db_path.to_string_lossy());
        settings.validate()?;
        Ok(settings)
    }
}

fn env_overlay(path: &Path, env_name: &str) -> Option<PathBuf> {
    let suffix = match env_name {
        "dev" | "development" => "dev",
        "prod" | "production" => "prod",
        "test" | "testing" => "test",
        _ => return None,
    };
    let stem = path.file_stem()?.to_string_lossy();
    Some(path.with_file_name(format!("{stem}.{suffix}.toml")))
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
