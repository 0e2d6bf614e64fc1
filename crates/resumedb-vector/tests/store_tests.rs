use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

use resumedb_core::{Embedder, Metadata};
use resumedb_embed::FakeEmbedder;
use resumedb_vector::{dump_records, list_collections, open_db, ResumeStore};

async fn store_in(tmp: &TempDir) -> anyhow::Result<ResumeStore> {
    let conn = open_db(tmp.path()).await?;
    Ok(ResumeStore::new(conn, "resumes", Arc::new(FakeEmbedder::new(64))))
}

fn baseline() -> Metadata {
    json!({"archive": false, "blocked": false}).as_object().cloned().unwrap()
}

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Embedding service that is always down.
struct UnreachableEmbedder;

#[async_trait]
impl Embedder for UnreachableEmbedder {
    fn model_id(&self) -> &str {
        "unreachable"
    }

    async fn embed_documents(&self, _texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        anyhow::bail!("connection refused")
    }
}

#[tokio::test]
async fn second_ingest_replaces_previous_chunks() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = store_in(&tmp).await?;

    let first = store
        .store_chunks(&texts(&["rust services", "team lead", "vector search"]), "2024/job123.pdf", &baseline())
        .await?;
    assert_eq!((first.replaced, first.inserted), (0, 3));

    let second = store
        .store_chunks(&texts(&["python services", "data pipelines"]), "2024/job123.pdf", &baseline())
        .await?;
    assert_eq!((second.replaced, second.inserted), (3, 2));

    let mut ids = store.get_ids("2024/job123.pdf").await?;
    ids.sort();
    assert_eq!(ids, vec!["2024/job123.pdf_chunk_0", "2024/job123.pdf_chunk_1"]);

    let records = dump_records(&open_db(tmp.path()).await?, "resumes").await?;
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.metadata["file_identifier"] == json!("2024/job123.pdf")));
    let contents: Vec<&str> = records.iter().map(|r| r.content.as_str()).collect();
    assert_eq!(contents, vec!["python services", "data pipelines"]);
    Ok(())
}

#[tokio::test]
async fn failed_embedding_keeps_previous_records() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = store_in(&tmp).await?;
    store
        .store_chunks(&texts(&["rust services", "team lead"]), "2024/job123.pdf", &baseline())
        .await?;

    let broken = ResumeStore::new(open_db(tmp.path()).await?, "resumes", Arc::new(UnreachableEmbedder));
    let err = broken
        .store_chunks(&texts(&["replacement"]), "2024/job123.pdf", &baseline())
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("connection refused"), "got {err:#}");

    let records = dump_records(&open_db(tmp.path()).await?, "resumes").await?;
    let stored: Vec<(&str, &str)> = records.iter().map(|r| (r.id.as_str(), r.content.as_str())).collect();
    assert_eq!(
        stored,
        vec![("2024/job123.pdf_chunk_0", "rust services"), ("2024/job123.pdf_chunk_1", "team lead")]
    );
    Ok(())
}

#[tokio::test]
async fn other_files_are_untouched_by_a_replace() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = store_in(&tmp).await?;

    store.store_chunks(&texts(&["alpha", "beta"]), "a/one.pdf", &baseline()).await?;
    store.store_chunks(&texts(&["gamma"]), "b/two.docx", &baseline()).await?;
    store.store_chunks(&texts(&["delta"]), "a/one.pdf", &baseline()).await?;

    assert_eq!(store.get_ids("a/one.pdf").await?, vec!["a/one.pdf_chunk_0"]);
    assert_eq!(store.get_ids("b/two.docx").await?, vec!["b/two.docx_chunk_0"]);
    Ok(())
}

#[tokio::test]
async fn stored_metadata_carries_injected_fields() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = store_in(&tmp).await?;

    let mut meta = baseline();
    meta.insert("chunk_index".into(), json!("caller value"));
    store.store_chunks(&texts(&["first", "second"]), "dir/cv.docx", &meta).await?;

    let records = dump_records(&open_db(tmp.path()).await?, "resumes").await?;
    assert_eq!(records[1].id, "dir/cv.docx_chunk_1");
    assert_eq!(records[1].metadata["chunk_index"], json!(1));
    assert_eq!(records[1].metadata["archive"], json!(false));
    assert_eq!(records[1].metadata["blocked"], json!(false));
    Ok(())
}

#[tokio::test]
async fn empty_chunk_list_clears_the_file() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = store_in(&tmp).await?;

    store.store_chunks(&texts(&["one", "two"]), "dir/cv.pdf", &baseline()).await?;
    let outcome = store.store_chunks(&[], "dir/cv.pdf", &baseline()).await?;
    assert_eq!((outcome.replaced, outcome.inserted), (2, 0));
    assert!(store.get_ids("dir/cv.pdf").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn top_hits_group_by_resume_in_hit_order() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = store_in(&tmp).await?;

    let mut a = baseline();
    a.insert("resume_id".into(), json!("A"));
    let mut b = baseline();
    b.insert("resume_id".into(), json!("B"));
    store
        .store_chunks(&texts(&["rust engineer tokio", "rust engineer lancedb"]), "x/a.pdf", &a)
        .await?;
    store.store_chunks(&texts(&["rust engineer axum"]), "x/b.pdf", &b).await?;

    let hits = store.search("rust engineer", 3).await?;
    assert_eq!(hits.len(), 3);
    assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));

    let groups = store.retrieve_matching_resumes("rust engineer", 3).await?;
    assert_eq!(groups.len(), 2);
    let mut ids: Vec<&str> = groups.iter().map(|g| g.resume_id.as_str()).collect();
    ids.sort();
    assert_eq!(ids, vec!["A", "B"]);

    let a_group = groups.iter().find(|g| g.resume_id == "A").unwrap();
    assert_eq!(a_group.chunks.len(), 2);
    let a_hits: Vec<&str> = hits
        .iter()
        .filter(|h| h.metadata["resume_id"] == json!("A"))
        .map(|h| h.content.as_str())
        .collect();
    assert_eq!(a_group.chunks, a_hits);
    assert_eq!(groups[0].resume_id, hits[0].metadata["resume_id"].as_str().unwrap());
    Ok(())
}

#[tokio::test]
async fn retrieval_without_collection_is_empty() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = store_in(&tmp).await?;
    assert!(store.retrieve_matching_resumes("anything", 5).await?.is_empty());
    assert!(store.get_ids("dir/cv.pdf").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn collections_are_listed_after_first_write() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = store_in(&tmp).await?;
    let conn = open_db(tmp.path()).await?;
    assert!(list_collections(&conn).await?.is_empty());

    store.store_chunks(&texts(&["hello"]), "d/f.pdf", &baseline()).await?;
    assert_eq!(list_collections(&conn).await?, vec!["resumes"]);
    Ok(())
}
