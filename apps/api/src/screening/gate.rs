use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::embedding::{Embedder, EmbeddingError};
use crate::llm_client::{LanguageModel, LlmError};

/// Shared throttle for external model calls within one screening run.
///
/// Caps in-flight calls across all candidates and bounds each call with a
/// timeout. Time spent waiting for a permit does not count against it.
#[derive(Clone)]
pub struct ModelGate {
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl ModelGate {
    pub fn new(max_concurrent_calls: usize, timeout: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent_calls.max(1))),
            timeout,
        }
    }

    pub async fn complete(&self, llm: &dyn LanguageModel, prompt: &str) -> Result<String, LlmError> {
        // The semaphore is never closed, so acquire cannot fail.
        let _permit = self.permits.acquire().await.ok();
        tokio::time::timeout(self.timeout, llm.complete(prompt))
            .await
            .unwrap_or(Err(LlmError::Timeout(self.timeout)))
    }

    pub async fn embed(&self, embedder: &dyn Embedder, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let _permit = self.permits.acquire().await.ok();
        tokio::time::timeout(self.timeout, embedder.embed(text))
            .await
            .unwrap_or(Err(EmbeddingError::Timeout(self.timeout)))
    }
}
