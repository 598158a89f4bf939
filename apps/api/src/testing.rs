//! Stub collaborators shared by unit tests. No network access.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::embedding::{Embedder, EmbeddingError};
use crate::errors::AppError;
use crate::llm_client::{LanguageModel, LlmError};
use crate::providers::{ClientProvider, ModelClients};

pub enum StubReply {
    Text(String),
    Fail,
    Hang,
}

type Responder = Box<dyn Fn(&str) -> StubReply + Send + Sync>;

/// Language model stub. Counts every `complete` call.
pub struct StubLlm {
    responder: Responder,
    calls: AtomicUsize,
}

impl StubLlm {
    pub fn with(responder: impl Fn(&str) -> StubReply + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn replying(text: &str) -> Self {
        let text = text.to_string();
        Self::with(move |_| StubReply::Text(text.clone()))
    }

    pub fn failing() -> Self {
        Self::with(|_| StubReply::Fail)
    }

    pub fn hanging() -> Self {
        Self::with(|_| StubReply::Hang)
    }

    /// Answers requirement prompts with a fixed verdict and summary prompts
    /// with a fixed sentence.
    pub fn screening(matched: bool) -> Self {
        Self::with(move |prompt| {
            if prompt.contains("Job Requirement:") {
                let verdict = if matched { "Yes" } else { "No" };
                StubReply::Text(format!(
                    "Matched: {verdict}\nConfidence: 90\nExplanation: stub verdict"
                ))
            } else {
                StubReply::Text("Solid candidate.".to_string())
            }
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModel for StubLlm {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match (self.responder)(prompt) {
            StubReply::Text(text) => Ok(text),
            StubReply::Fail => Err(LlmError::Api {
                status: 503,
                message: "stub outage".to_string(),
            }),
            StubReply::Hang => futures::future::pending().await,
        }
    }
}

type EmbedFn = Box<dyn Fn(&str) -> Option<Vec<f32>> + Send + Sync>;

/// Embedding stub. `None` from the closure means the call fails; the
/// closure may also panic to simulate a crashing collaborator.
pub struct StubEmbedder {
    embed_fn: EmbedFn,
    dimension: usize,
    hang: bool,
    calls: AtomicUsize,
}

impl StubEmbedder {
    pub fn with(
        dimension: usize,
        embed_fn: impl Fn(&str) -> Option<Vec<f32>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            embed_fn: Box::new(embed_fn),
            dimension,
            hang: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every text maps to the same unit vector, so similarity is 1.0.
    pub fn constant(dimension: usize) -> Self {
        Self::with(dimension, move |_| Some(vec![1.0; dimension]))
    }

    pub fn failing(dimension: usize) -> Self {
        Self::with(dimension, |_| None)
    }

    pub fn hanging(dimension: usize) -> Self {
        Self {
            hang: true,
            ..Self::failing(dimension)
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hang {
            return futures::future::pending().await;
        }
        (self.embed_fn)(text).ok_or(EmbeddingError::EmptyEmbedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Hands out pre-built clients.
pub struct StaticProvider {
    pub llm: Arc<StubLlm>,
    pub embedder: Arc<StubEmbedder>,
}

impl StaticProvider {
    pub fn new(llm: StubLlm, embedder: StubEmbedder) -> Self {
        Self {
            llm: Arc::new(llm),
            embedder: Arc::new(embedder),
        }
    }
}

impl ClientProvider for StaticProvider {
    fn connect(&self) -> Result<ModelClients, AppError> {
        Ok(ModelClients {
            llm: self.llm.clone(),
            embedder: self.embedder.clone(),
        })
    }
}

/// Always fails to construct clients.
pub struct FailingProvider;

impl ClientProvider for FailingProvider {
    fn connect(&self) -> Result<ModelClients, AppError> {
        Err(AppError::Initialization(
            "language model: No API key configured".to_string(),
        ))
    }
}
