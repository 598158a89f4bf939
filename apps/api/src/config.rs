use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::screening::aggregator::ScoringPolicy;
use crate::screening::orchestrator::ScreeningSettings;

/// Language-model connection settings. A missing key is not a startup error;
/// it fails the first screening run instead.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model: "llama3-70b-8192".to_string(),
            temperature: 0.3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmbeddingSettings {
    pub base_url: String,
    pub model: String,
    /// Length of the zero vector substituted when embedding fails.
    pub dimension: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "nomic-embed-text".to_string(),
            dimension: 768,
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    pub model_timeout: Duration,
    pub max_concurrent_candidates: usize,
    pub max_concurrent_model_calls: usize,
    pub scoring: ScoringPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let llm_defaults = LlmSettings::default();
        let embedding_defaults = EmbeddingSettings::default();
        let scoring_defaults = ScoringPolicy::default();

        Ok(Config {
            port: parse_env("PORT", 8000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            llm: LlmSettings {
                api_key: std::env::var("LLM_API_KEY")
                    .or_else(|_| std::env::var("GROQ_API_KEY"))
                    .ok(),
                api_url: env_or("LLM_API_URL", llm_defaults.api_url),
                model: env_or("LLM_MODEL", llm_defaults.model),
                temperature: parse_env("LLM_TEMPERATURE", llm_defaults.temperature)?,
            },
            embedding: EmbeddingSettings {
                base_url: env_or("EMBEDDING_URL", embedding_defaults.base_url),
                model: env_or("EMBEDDING_MODEL", embedding_defaults.model),
                dimension: parse_env("EMBEDDING_DIMENSION", embedding_defaults.dimension)?,
            },
            model_timeout: Duration::from_secs(parse_env("MODEL_TIMEOUT_SECS", 30)?),
            max_concurrent_candidates: parse_env("MAX_CONCURRENT_CANDIDATES", 4)?,
            max_concurrent_model_calls: parse_env("MAX_CONCURRENT_MODEL_CALLS", 8)?,
            scoring: ScoringPolicy {
                similarity_weight: parse_env(
                    "SIMILARITY_WEIGHT",
                    scoring_defaults.similarity_weight,
                )?,
                requirements_weight: parse_env(
                    "REQUIREMENTS_WEIGHT",
                    scoring_defaults.requirements_weight,
                )?,
                fallback_confidence: parse_env(
                    "FALLBACK_CONFIDENCE",
                    scoring_defaults.fallback_confidence,
                )?,
                ..scoring_defaults
            },
        })
    }

    /// Per-run settings handed to the orchestrator.
    pub fn screening_settings(&self) -> ScreeningSettings {
        ScreeningSettings {
            model_timeout: self.model_timeout,
            max_concurrent_candidates: self.max_concurrent_candidates.max(1),
            max_concurrent_model_calls: self.max_concurrent_model_calls.max(1),
            policy: self.scoring.clone(),
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
