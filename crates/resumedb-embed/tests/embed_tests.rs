use resumedb_core::{Embedder, Settings};
use resumedb_embed::{embedder_from_settings, FakeEmbedder};

#[tokio::test]
async fn fake_embedder_shapes_and_determinism() {
    let embedder = FakeEmbedder::new(768);
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_documents(&texts).await.expect("embed_documents");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), 768, "embedding dim is 768");

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
}

#[tokio::test]
async fn query_embedding_matches_document_embedding() {
    let embedder = FakeEmbedder::new(64);
    let q = embedder.embed_query("rust engineer").await.expect("embed_query");
    let d = embedder.embed_documents(&["rust engineer".to_string()]).await.expect("embed");
    assert_eq!(q, d[0]);
}

#[tokio::test]
async fn shared_words_are_closer_than_disjoint_ones() {
    let embedder = FakeEmbedder::new(256);
    let texts = vec![
        "senior rust engineer".to_string(),
        "rust engineer".to_string(),
        "pastry chef bakery".to_string(),
    ];
    let v = embedder.embed_documents(&texts).await.unwrap();
    let dot = |a: &[f32], b: &[f32]| a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
    assert!(dot(&v[0], &v[1]) > dot(&v[0], &v[2]));
}

#[tokio::test]
async fn zero_dimension_is_an_error() {
    let embedder = FakeEmbedder::new(0);
    let err = embedder.embed_documents(&["hello".to_string()]).await.unwrap_err();
    assert!(err.to_string().contains("dimension"), "got {err}");
    assert!(embedder.embed_query("hello").await.is_err());
}

#[test]
fn settings_select_fake_embedder() {
    let settings = Settings { use_fake_embeddings: true, fake_embedding_dim: 32, ..Settings::default() };
    let embedder = embedder_from_settings(&settings).expect("embedder");
    assert_eq!(embedder.model_id(), "fake:d32");
}

#[test]
fn settings_select_ollama_by_default() {
    let embedder = embedder_from_settings(&Settings::default()).expect("embedder");
    assert_eq!(embedder.model_id(), "nomic-embed-text");
}
