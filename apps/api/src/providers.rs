//! Model client construction.
//!
//! Clients are built per screening run through a `ClientProvider` and passed
//! down explicitly; there are no process-wide singletons.

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::embedding::{Embedder, OllamaEmbedder};
use crate::errors::AppError;
use crate::llm_client::{LanguageModel, LlmClient};

/// Initialized collaborators for one run. Safe to share across candidates.
#[derive(Clone)]
pub struct ModelClients {
    pub embedder: Arc<dyn Embedder>,
    pub llm: Arc<dyn LanguageModel>,
}

pub trait ClientProvider: Send + Sync {
    /// Any failure here aborts the whole run with `AppError::Initialization`.
    fn connect(&self) -> Result<ModelClients, AppError>;
}

/// Builds HTTP clients from application config.
pub struct HttpClientProvider {
    config: Config,
}

impl HttpClientProvider {
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }
}

impl ClientProvider for HttpClientProvider {
    fn connect(&self) -> Result<ModelClients, AppError> {
        let llm = LlmClient::new(&self.config.llm, self.config.model_timeout)
            .map_err(|e| AppError::Initialization(format!("language model: {e}")))?;
        let embedder = OllamaEmbedder::new(&self.config.embedding, self.config.model_timeout)
            .map_err(|e| AppError::Initialization(format!("embedding model: {e}")))?;

        info!(
            "Model clients ready (llm: {}, embeddings: {})",
            llm.model(),
            embedder.endpoint()
        );

        Ok(ModelClients {
            embedder: Arc::new(embedder),
            llm: Arc::new(llm),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::{EmbeddingSettings, LlmSettings};
    use crate::screening::aggregator::ScoringPolicy;

    fn config(api_key: Option<&str>) -> Config {
        Config {
            port: 8000,
            rust_log: "info".to_string(),
            llm: LlmSettings {
                api_key: api_key.map(str::to_string),
                ..LlmSettings::default()
            },
            embedding: EmbeddingSettings::default(),
            model_timeout: Duration::from_secs(5),
            max_concurrent_candidates: 2,
            max_concurrent_model_calls: 4,
            scoring: ScoringPolicy::default(),
        }
    }

    #[test]
    fn test_missing_api_key_is_initialization_failure() {
        let provider = HttpClientProvider::from_config(config(None));
        match provider.connect() {
            Err(AppError::Initialization(msg)) => assert!(msg.contains("language model")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected initialization failure"),
        }
    }

    #[test]
    fn test_clients_build_with_api_key() {
        let provider = HttpClientProvider::from_config(config(Some("gsk_test")));
        let clients = provider.connect().unwrap();
        assert_eq!(clients.embedder.dimension(), 768);
    }
}
