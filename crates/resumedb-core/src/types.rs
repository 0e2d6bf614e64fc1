//! Domain types shared by the store, the retriever and the ingestion driver.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Per-chunk attributes stored alongside every record.
pub type Metadata = serde_json::Map<String, Value>;

pub const FILE_IDENTIFIER_KEY: &str = "file_identifier";
pub const CHUNK_INDEX_KEY: &str = "chunk_index";
pub const RESUME_ID_KEY: &str = "resume_id";

/// Storage id of the `index`-th chunk of a file.
pub fn chunk_id(file_identifier: &str, index: usize) -> String {
    format!("{file_identifier}_chunk_{index}")
}

/// Caller metadata plus the injected `file_identifier` and `chunk_index`.
/// Injected keys overwrite caller keys of the same name.
pub fn merge_metadata(base: &Metadata, file_identifier: &str, index: usize) -> Metadata {
    let mut merged = base.clone();
    merged.insert(FILE_IDENTIFIER_KEY.to_string(), Value::from(file_identifier));
    merged.insert(CHUNK_INDEX_KEY.to_string(), Value::from(index));
    merged
}

/// One similarity-search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub id: String,
    pub content: String,
    pub metadata: Metadata,
    /// Cosine distance to the query; lower is closer.
    pub distance: f32,
}

impl RetrievedChunk {
    /// Grouping key: `resume_id` when present, otherwise the file identifier.
    pub fn resume_key(&self) -> String {
        [RESUME_ID_KEY, FILE_IDENTIFIER_KEY]
            .iter()
            .find_map(|k| self.metadata.get(*k))
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_default()
    }
}

/// Retrieved chunks aggregated per originating document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeMatch {
    pub resume_id: String,
    pub chunks: Vec<String>,
    /// Metadata of the first hit seen for this document.
    pub metadata: Metadata,
}

/// Group hits by document, preserving hit order inside each group and the
/// order in which groups first appear. No dedup, no re-ranking.
pub fn group_by_resume(hits: Vec<RetrievedChunk>) -> Vec<ResumeMatch> {
    let mut groups: Vec<ResumeMatch> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for hit in hits {
        let key = hit.resume_key();
        match positions.get(&key) {
            Some(&pos) => groups[pos].chunks.push(hit.content),
            None => {
                positions.insert(key.clone(), groups.len());
                groups.push(ResumeMatch {
                    resume_id: key,
                    chunks: vec![hit.content],
                    metadata: hit.metadata,
                });
            }
        }
    }
    groups
}

/// Outcome of replacing the stored chunks of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOutcome {
    pub file_identifier: String,
    /// Records that existed for the identifier before the write.
    pub replaced: usize,
    /// Records written by this call.
    pub inserted: usize,
}
