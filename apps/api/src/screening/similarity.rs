use std::sync::Arc;

use tracing::warn;

use crate::embedding::{cosine_similarity, Embedder};
use crate::screening::gate::ModelGate;

/// An embedding vector, flagged when it is a zero-vector stand-in.
#[derive(Debug, Clone)]
pub struct Embedding {
    pub vector: Vec<f32>,
    pub substituted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityOutcome {
    /// Always finite, in [0, 1].
    pub score: f64,
    /// At least one side used a substituted zero vector, so `score` is 0
    /// for lack of data rather than for lack of relevance.
    pub degraded: bool,
}

/// Semantic similarity between two texts via embeddings.
#[derive(Clone)]
pub struct SimilarityScorer {
    embedder: Arc<dyn Embedder>,
    gate: ModelGate,
}

impl SimilarityScorer {
    pub fn new(embedder: Arc<dyn Embedder>, gate: ModelGate) -> Self {
        Self { embedder, gate }
    }

    /// Never fails: an embedding error or timeout yields a zero vector of
    /// the embedder's dimension.
    pub async fn embed_or_zero(&self, text: &str) -> Embedding {
        match self.gate.embed(self.embedder.as_ref(), text).await {
            Ok(vector) => Embedding {
                vector,
                substituted: false,
            },
            Err(e) => {
                warn!("Embedding failed, substituting zero vector: {e}");
                Embedding {
                    vector: vec![0.0; self.embedder.dimension()],
                    substituted: true,
                }
            }
        }
    }

    pub fn compare(&self, a: &Embedding, b: &Embedding) -> SimilarityOutcome {
        let raw = f64::from(cosine_similarity(&a.vector, &b.vector));
        let score = if raw.is_finite() { raw.clamp(0.0, 1.0) } else { 0.0 };
        SimilarityOutcome {
            score,
            degraded: a.substituted || b.substituted,
        }
    }

    /// Embeds both texts concurrently. Screening runs embed the job
    /// description once and use `compare` instead.
    #[cfg(test)]
    pub async fn similarity(&self, text_a: &str, text_b: &str) -> SimilarityOutcome {
        let (a, b) = tokio::join!(self.embed_or_zero(text_a), self.embed_or_zero(text_b));
        self.compare(&a, &b)
    }
}
