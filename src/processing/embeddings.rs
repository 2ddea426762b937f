//! Embedding capability and the per-document vector cache

use crate::config::Config;
use crate::error::{CheckerError, Result};
use crate::processing::embedding_manager::{model_catalog, resolve_model_id};
use crate::processing::segmenter::UnitCorpus;
use anyhow::Context;
use log::{debug, info};
use model2vec_rs::model::StaticModel;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Text embedding capability. Identical input must yield identical output.
pub trait Embedder: Send + Sync {
    fn encode(&self, text: &str) -> Result<Vec<f32>>;

    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.encode(t)).collect()
    }
}

impl<E: Embedder + ?Sized> Embedder for Arc<E> {
    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        (**self).encode(text)
    }

    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        (**self).encode_batch(texts)
    }
}

/// Model2Vec static embeddings.
pub struct StaticEmbedder {
    model: StaticModel,
    batch_size: usize,
    model_name: String,
}

impl StaticEmbedder {
    pub fn new(model_path: &Path, model_name: &str, batch_size: usize) -> Result<Self> {
        let start_time = Instant::now();

        info!("Loading Model2Vec embedding model from: {}", model_path.display());

        let model = StaticModel::from_pretrained(
            model_path,
            None, // token
            Some(true), // normalize
            None, // subfolder
        )
        .with_context(|| format!("Failed to load model from {}", model_path.display()))?;

        info!("Model loaded successfully in {:.2?}", start_time.elapsed());

        Ok(Self {
            model,
            batch_size: batch_size.max(1),
            model_name: model_name.to_string(),
        })
    }

    /// Load the configured model, preferring a local copy under the models directory.
    pub fn from_config(config: &Config) -> Result<Self> {
        let model_name = &config.models.embedding_model;
        let model_path = Self::resolve_model_path(config, model_name);
        Self::new(&model_path, model_name, config.models.batch_size)
    }

    fn resolve_model_path(config: &Config, model_name: &str) -> PathBuf {
        let model_id = resolve_model_id(model_name);

        let local_path = config.models_dir().join(model_id.as_deref().unwrap_or(model_name));
        if local_path.exists() {
            return local_path;
        }
        // Anything else is handed to Model2Vec as a HuggingFace repo id
        match model_id {
            Some(id) => PathBuf::from(&model_catalog()[&id].repo_id),
            None => PathBuf::from(model_name),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl Embedder for StaticEmbedder {
    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.model.encode_single(text))
    }

    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            embeddings.extend(self.model.encode(batch));
        }
        Ok(embeddings)
    }
}

/// L2-normalize in place. Zero vectors are left untouched.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|x| *x /= norm);
    }
}

/// Dot product; equals cosine similarity for unit-norm inputs.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Unit-norm vectors for one document's units, plus the query phrases that
/// will be matched against them. Built once per evaluation run; read-only after.
#[derive(Debug, Clone, Default)]
pub struct DocumentVectors {
    unit_vectors: Vec<Vec<f32>>,
    phrase_vectors: HashMap<String, Vec<f32>>,
    dimension: usize,
}

impl DocumentVectors {
    pub fn unit_vectors(&self) -> &[Vec<f32>] {
        &self.unit_vectors
    }

    pub fn unit_vector(&self, index: usize) -> Option<&[f32]> {
        self.unit_vectors.get(index).map(Vec::as_slice)
    }

    pub fn phrase_vector(&self, phrase: &str) -> Option<&[f32]> {
        self.phrase_vectors.get(phrase).map(Vec::as_slice)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.unit_vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unit_vectors.is_empty()
    }
}

/// Vectorize-once cache over the embedding capability.
pub struct EmbeddingCache<'a> {
    embedder: &'a dyn Embedder,
}

impl<'a> EmbeddingCache<'a> {
    pub fn new(embedder: &'a dyn Embedder) -> Self {
        Self { embedder }
    }

    /// Vectorize units only.
    pub fn vectorize(&self, corpus: &UnitCorpus) -> Result<DocumentVectors> {
        self.vectorize_with_phrases(corpus, &[])
    }

    /// Vectorize units and distinct query phrases in a single capability call.
    /// Nothing to embed means no call at all.
    pub fn vectorize_with_phrases(&self, corpus: &UnitCorpus, phrases: &[String]) -> Result<DocumentVectors> {
        if corpus.is_empty() {
            return Ok(DocumentVectors::default());
        }

        let mut distinct_phrases: Vec<String> = Vec::new();
        for phrase in phrases {
            if !distinct_phrases.contains(phrase) {
                distinct_phrases.push(phrase.clone());
            }
        }

        let mut texts: Vec<String> = Vec::with_capacity(corpus.len() + distinct_phrases.len());
        texts.extend(corpus.units().iter().cloned());
        texts.extend(distinct_phrases.iter().cloned());

        let start_time = Instant::now();
        let mut vectors = self.embedder.encode_batch(&texts)?;

        if vectors.len() != texts.len() {
            return Err(CheckerError::embedding(format!(
                "Expected {} vectors, got {}",
                texts.len(),
                vectors.len()
            )));
        }

        let dimension = vectors.first().map(Vec::len).unwrap_or(0);
        if dimension == 0 {
            return Err(CheckerError::embedding("Model returned empty vectors"));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
            return Err(CheckerError::embedding(format!(
                "Embedding dimensions don't match: {} vs {}",
                dimension,
                bad.len()
            )));
        }

        vectors.iter_mut().for_each(|v| l2_normalize(v));

        let phrase_vectors: HashMap<String, Vec<f32>> =
            distinct_phrases.into_iter().zip(vectors.split_off(corpus.len())).collect();

        debug!(
            "Vectorized {} units and {} phrases (dim {}) in {:.2?}",
            corpus.len(),
            phrase_vectors.len(),
            dimension,
            start_time.elapsed()
        );

        Ok(DocumentVectors {
            unit_vectors: vectors,
            phrase_vectors,
            dimension,
        })
    }
}
