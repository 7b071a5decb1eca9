//! Text embedding encoders.
//!
//! Embeddings are fixed-dimension unit vectors compared with dot products
//! (cosine similarity for unit vectors). Two logical encoder instances exist,
//! one tuned toward retrieval queries and one toward tool descriptions; both
//! share the same contract and dimensionality.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::AgentConfig;
use crate::errors::{ConfigError, EmbeddingError};

/// A fixed-dimension embedding vector.
///
/// Invariant: unit Euclidean norm, except for the exact zero vector when the
/// raw source norm was zero. Similarity comparisons across mismatched
/// dimensionality fail fast instead of truncating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    /// Build an embedding from raw coordinates, normalizing to unit length.
    ///
    /// A zero-norm input stays the zero vector rather than dividing by zero.
    pub fn from_raw(mut values: Vec<f32>) -> Self {
        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut values {
                *v /= norm;
            }
        }
        Self(values)
    }

    /// Wrap coordinates that are already normalized (e.g. loaded from storage)
    pub fn from_normalized(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn norm(&self) -> f32 {
        self.0.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Dot product with another embedding.
    ///
    /// Fails fast on dimensionality mismatch; silent truncation would turn a
    /// deployment error into a wrong similarity ranking.
    pub fn dot(&self, other: &Embedding) -> Result<f32, EmbeddingError> {
        if self.dim() != other.dim() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dim(),
                actual: other.dim(),
            });
        }
        Ok(self.0.iter().zip(other.0.iter()).map(|(a, b)| a * b).sum())
    }
}

/// Contract for mapping free text to embedding vectors.
///
/// Implementations must be pure functions of the input text and encoder
/// configuration: no side effects, same text always yields the same vector.
pub trait Encoder: Send + Sync {
    /// Configured output dimensionality
    fn dim(&self) -> usize;

    /// Encode one text into a unit-normalized embedding
    fn encode(&self, text: &str) -> Embedding;

    /// Encode several texts, preserving input order.
    ///
    /// Observably equivalent to calling [`Encoder::encode`] per item.
    fn batch_encode(&self, texts: &[String]) -> Vec<Embedding> {
        texts.iter().map(|text| self.encode(text)).collect()
    }
}

/// Deterministic seeded-projection encoder.
///
/// The text is hashed, the hash is mixed with the configured base seed, and a
/// seeded generator draws the coordinates before unit normalization. Distinct
/// base seeds give the query and description encoders different projections of
/// the same space. A model-backed encoder can replace this behind the same
/// [`Encoder`] contract.
#[derive(Debug, Clone)]
pub struct ProjectionEncoder {
    dim: usize,
    base_seed: u64,
}

impl ProjectionEncoder {
    /// Create an encoder with the given dimensionality and base seed.
    ///
    /// A zero dimension is rejected here, at construction, never at first use.
    pub fn new(dim: usize, base_seed: u64) -> Result<Self, ConfigError> {
        if dim == 0 {
            return Err(ConfigError::InvalidDimension(dim));
        }
        Ok(Self { dim, base_seed })
    }

    /// The query-tuned encoder instance for a configuration
    pub fn for_queries(config: &AgentConfig) -> Result<Self, ConfigError> {
        Self::new(config.embedding_dim, config.query_encoder_seed)
    }

    /// The description-tuned encoder instance for a configuration
    pub fn for_descriptions(config: &AgentConfig) -> Result<Self, ConfigError> {
        Self::new(config.embedding_dim, config.description_encoder_seed)
    }
}

impl Encoder for ProjectionEncoder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn encode(&self, text: &str) -> Embedding {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let mut rng = StdRng::seed_from_u64(self.base_seed ^ hasher.finish());
        let raw: Vec<f32> = (0..self.dim)
            .map(|_| rng.gen_range(-1.0f32..1.0f32))
            .collect();
        Embedding::from_raw(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_produces_unit_vectors_of_configured_dimension() {
        let encoder = ProjectionEncoder::new(64, 7).unwrap();
        for text in ["", "weather in Paris", "calculate 12*7", "tool"] {
            let embedding = encoder.encode(text);
            assert_eq!(embedding.dim(), 64);
            assert!((embedding.norm() - 1.0).abs() < 1e-5, "norm for '{text}'");
        }
    }

    #[test]
    fn encode_is_deterministic_per_text() {
        let encoder = ProjectionEncoder::new(32, 99).unwrap();
        assert_eq!(encoder.encode("alpha"), encoder.encode("alpha"));
        assert_ne!(encoder.encode("alpha"), encoder.encode("beta"));
    }

    #[test]
    fn distinct_seeds_project_differently() {
        let a = ProjectionEncoder::new(32, 1).unwrap();
        let b = ProjectionEncoder::new(32, 2).unwrap();
        assert_ne!(a.encode("same text"), b.encode("same text"));
    }

    #[test]
    fn batch_encode_matches_per_item_encode_in_order() {
        let encoder = ProjectionEncoder::new(16, 5).unwrap();
        let texts = vec!["one".to_string(), "two".to_string(), "three".to_string()];
        let batch = encoder.batch_encode(&texts);
        assert_eq!(batch.len(), 3);
        for (text, embedding) in texts.iter().zip(&batch) {
            assert_eq!(embedding, &encoder.encode(text));
        }
    }

    #[test]
    fn zero_dimension_fails_at_construction() {
        assert!(matches!(
            ProjectionEncoder::new(0, 1),
            Err(ConfigError::InvalidDimension(0))
        ));
    }

    #[test]
    fn zero_raw_vector_stays_zero() {
        let embedding = Embedding::from_raw(vec![0.0; 8]);
        assert_eq!(embedding.norm(), 0.0);
        assert_eq!(embedding.as_slice(), &[0.0; 8]);
    }

    #[test]
    fn dot_product_rejects_mismatched_dimensions() {
        let a = Embedding::from_raw(vec![1.0, 0.0]);
        let b = Embedding::from_raw(vec![1.0, 0.0, 0.0]);
        assert!(matches!(
            a.dot(&b),
            Err(EmbeddingError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn dot_product_of_identical_unit_vectors_is_one() {
        let encoder = ProjectionEncoder::new(128, 3).unwrap();
        let v = encoder.encode("self similarity");
        let dot = v.dot(&v).unwrap();
        assert!((dot - 1.0).abs() < 1e-5);
    }
}
