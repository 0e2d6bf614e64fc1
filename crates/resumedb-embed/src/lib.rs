use anyhow::{bail, Result};
use async_trait::async_trait;
use std::hash::Hasher;
use std::sync::Arc;
use twox_hash::XxHash64;

use resumedb_core::{Embedder, Settings};

pub mod ollama;

pub use ollama::OllamaEmbedder;

/// Deterministic, offline embedder for tests and development.
///
/// Whitespace tokens are hashed into buckets of a fixed-size vector which is
/// then L2-normalised, so texts sharing words land close together.
pub struct FakeEmbedder {
    dim: usize,
    id: String,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim, id: format!("fake:d{dim}") }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            hasher.write(token.to_lowercase().as_bytes());
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        v
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    fn model_id(&self) -> &str {
        &self.id
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if self.dim == 0 {
            bail!("fake embedding dimension must be at least 1");
        }
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

/// Build the embedder selected by configuration: the fake one when
/// `use_fake_embeddings` is set, otherwise the Ollama client.
pub fn embedder_from_settings(settings: &Settings) -> Result<Arc<dyn Embedder>> {
    if settings.use_fake_embeddings {
        tracing::info!(dim = settings.fake_embedding_dim, "using fake embedder");
        return Ok(Arc::new(FakeEmbedder::new(settings.fake_embedding_dim)));
    }
    let embedder = OllamaEmbedder::new(
        &settings.embedding_url,
        &settings.embedding_model,
        std::time::Duration::from_secs(settings.embedding_timeout_secs),
    )?;
    tracing::info!(model = %settings.embedding_model, url = %settings.embedding_url, "using Ollama embedder");
    Ok(Arc::new(embedder))
}
