use anyhow::{anyhow, bail, Context, Result};
use arrow_array::{FixedSizeListArray, Float32Array, Int32Array, RecordBatch, RecordBatchIterator, StringArray};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase, Select};
use lancedb::{Connection, DistanceType, Table};
use std::sync::Arc;

use resumedb_core::{chunk_id, group_by_resume, merge_metadata, Embedder, Metadata, ResumeMatch, RetrievedChunk, StoreOutcome};

use crate::schema::build_arrow_schema;
use crate::table::{ensure_table, file_filter, open_if_exists, string_column};

/// Chunk records of one collection, keyed by file identifier.
pub struct ResumeStore {
    db: Connection,
    collection: String,
    embedder: Arc<dyn Embedder>,
}

impl ResumeStore {
    pub fn new(db: Connection, collection: &str, embedder: Arc<dyn Embedder>) -> Self {
        Self { db, collection: collection.to_string(), embedder }
    }

    /// Ids of every record stored for `file_identifier`.
    pub async fn get_ids(&self, file_identifier: &str) -> Result<Vec<String>> {
        let Some(table) = open_if_exists(&self.db, &self.collection).await? else {
            return Ok(Vec::new());
        };
        let mut stream = table
            .query()
            .only_if(file_filter(file_identifier))
            .select(Select::columns(&["id"]))
            .execute()
            .await?;
        let mut ids = Vec::new();
        while let Some(batch) = stream.try_next().await? {
            let col = string_column(&batch, "id")?;
            ids.extend((0..batch.num_rows()).map(|i| col.value(i).to_string()));
        }
        Ok(ids)
    }

    /// Replace everything stored for `file_identifier` with `chunks`.
    ///
    /// The upsert and the removal of stale chunks land in one commit, so a
    /// failure at any step leaves the previous records in place.
    pub async fn store_chunks(&self, chunks: &[String], file_identifier: &str, metadata: &Metadata) -> Result<StoreOutcome> {
        let existing = self.get_ids(file_identifier).await?;
        let filter = file_filter(file_identifier);

        if chunks.is_empty() {
            if let Some(table) = open_if_exists(&self.db, &self.collection).await? {
                if !existing.is_empty() {
                    table.delete(&filter).await?;
                }
            }
            tracing::info!(file = file_identifier, removed = existing.len(), "cleared stored chunks");
            return Ok(StoreOutcome { file_identifier: file_identifier.to_string(), replaced: existing.len(), inserted: 0 });
        }

        let embeddings = self
            .embedder
            .embed_documents(chunks)
            .await
            .with_context(|| format!("embedding chunks of {file_identifier}"))?;
        if embeddings.len() != chunks.len() {
            bail!("embedder returned {} vectors for {} chunks", embeddings.len(), chunks.len());
        }

        let batch = to_record_batch(chunks, &embeddings, file_identifier, metadata)?;
        let schema = batch.schema();
        let table = ensure_table(&self.db, &self.collection, schema.clone()).await?;
        let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));

        let mut mi = table.merge_insert(&["id"]);
        mi.when_matched_update_all(None)
            .when_not_matched_insert_all()
            .when_not_matched_by_source_delete(Some(filter.clone()));
        mi.execute(reader)
            .await
            .with_context(|| format!("writing chunks of {file_identifier}"))?;

        let stored = table.count_rows(Some(filter)).await?;
        if stored != chunks.len() {
            bail!("{file_identifier}: expected {} stored chunks after write, found {stored}", chunks.len());
        }

        tracing::info!(
            file = file_identifier,
            replaced = existing.len(),
            inserted = chunks.len(),
            collection = %self.collection,
            "stored chunks"
        );
        Ok(StoreOutcome { file_identifier: file_identifier.to_string(), replaced: existing.len(), inserted: chunks.len() })
    }

    /// The `top_k` chunks closest to `query_text`, grouped by document.
    pub async fn retrieve_matching_resumes(&self, query_text: &str, top_k: usize) -> Result<Vec<ResumeMatch>> {
        let hits = self.search(query_text, top_k).await?;
        Ok(group_by_resume(hits))
    }

    /// Raw cosine top-k hits, closest first.
    pub async fn search(&self, query_text: &str, top_k: usize) -> Result<Vec<RetrievedChunk>> {
        let Some(table) = open_if_exists(&self.db, &self.collection).await? else {
            tracing::warn!(collection = %self.collection, "collection does not exist; nothing to search");
            return Ok(Vec::new());
        };
        let query_embedding = self.embedder.embed_query(query_text).await.context("embedding query")?;
        search_table(&table, query_embedding, top_k).await
    }
}

async fn search_table(table: &Table, query_embedding: Vec<f32>, top_k: usize) -> Result<Vec<RetrievedChunk>> {
    let mut results = table
        .vector_search(query_embedding)?
        .distance_type(DistanceType::Cosine)
        .limit(top_k)
        .execute()
        .await?;

    let mut hits = Vec::new();
    while let Some(batch) = results.try_next().await? {
        let ids = string_column(&batch, "id")?;
        let contents = string_column(&batch, "content")?;
        let metas = string_column(&batch, "metadata")?;
        let distances = batch
            .column_by_name("_distance")
            .and_then(|c| c.as_any().downcast_ref::<Float32Array>());
        for i in 0..batch.num_rows() {
            hits.push(RetrievedChunk {
                id: ids.value(i).to_string(),
                content: contents.value(i).to_string(),
                metadata: parse_metadata(metas.value(i))?,
                distance: distances.map_or(0.0, |d| d.value(i)),
            });
        }
    }
    Ok(hits)
}

pub(crate) fn parse_metadata(raw: &str) -> Result<Metadata> {
    serde_json::from_str(raw).map_err(|e| anyhow!("corrupt metadata {raw:?}: {e}"))
}

fn to_record_batch(chunks: &[String], embeddings: &[Vec<f32>], file_identifier: &str, metadata: &Metadata) -> Result<RecordBatch> {
    let dim = embeddings[0].len();
    if dim == 0 || embeddings.iter().any(|e| e.len() != dim) {
        bail!("embeddings must share one non-zero dimension");
    }
    let mut ids = Vec::with_capacity(chunks.len());
    let mut file_ids = Vec::with_capacity(chunks.len());
    let mut indices = Vec::with_capacity(chunks.len());
    let mut metas = Vec::with_capacity(chunks.len());
    for index in 0..chunks.len() {
        ids.push(chunk_id(file_identifier, index));
        file_ids.push(file_identifier.to_string());
        indices.push(i32::try_from(index)?);
        metas.push(serde_json::to_string(&merge_metadata(metadata, file_identifier, index))?);
    }
    let vectors = embeddings.iter().map(|v| Some(v.iter().map(|&x| Some(x)).collect::<Vec<_>>()));
    let dim = i32::try_from(dim)?;

    Ok(RecordBatch::try_new(
        build_arrow_schema(dim),
        vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(StringArray::from(file_ids)),
            Arc::new(Int32Array::from(indices)),
            Arc::new(StringArray::from(chunks.to_vec())),
            Arc::new(StringArray::from(metas)),
            Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vectors, dim)),
        ],
    )?)
}
