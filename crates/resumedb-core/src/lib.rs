//! Shared building blocks for resume ingestion and retrieval: configuration,
//! errors, domain types, the embedder seam, file discovery and chunking.

pub mod chunking;
pub mod config;
pub mod error;
pub mod files;
pub mod traits;
pub mod types;

pub use chunking::{chunk_file, ChunkingConfig, RecursiveSplitter};
pub use config::{Config, Settings};
pub use error::{Error, Result};
pub use files::{get_file_id, iterate_files, DocumentKind};
pub use traits::Embedder;
pub use types::{
    chunk_id, group_by_resume, merge_metadata, Metadata, ResumeMatch, RetrievedChunk, StoreOutcome,
};
