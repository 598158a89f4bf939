//! Screening orchestrator: one run over many candidates.
//!
//! Pipeline per run:
//!   1. Connect model clients (fatal on failure)
//!   2. Parse + embed the job description once
//!   3. Per candidate, concurrently up to `max_concurrent_candidates`:
//!      structure resume → (similarity ∥ requirement matching) → aggregate
//!   4. Stable sort by match score, descending
//!
//! A panic while screening one candidate becomes a `Failed` result for that
//! candidate only. Nothing is spawned, so dropping the run future abandons
//! every in-flight model call.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use futures::FutureExt;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::extraction::{extract_structured_resume, is_extraction_error, parse_job_description};
use crate::models::job::JobDescription;
use crate::models::resume::ResumeDocument;
use crate::models::screening::ScreeningResult;
use crate::providers::{ClientProvider, ModelClients};
use crate::screening::aggregator::{CandidateEvidence, ScoringAggregator, ScoringPolicy};
use crate::screening::gate::ModelGate;
use crate::screening::matcher::RequirementMatcher;
use crate::screening::similarity::{Embedding, SimilarityScorer};

#[derive(Debug, Clone)]
pub struct ScreeningSettings {
    /// Upper bound on every single embedding or language-model call.
    pub model_timeout: Duration,
    pub max_concurrent_candidates: usize,
    /// Shared across all candidates of a run.
    pub max_concurrent_model_calls: usize,
    pub policy: ScoringPolicy,
}

impl Default for ScreeningSettings {
    fn default() -> Self {
        Self {
            model_timeout: Duration::from_secs(30),
            max_concurrent_candidates: 4,
            max_concurrent_model_calls: 8,
            policy: ScoringPolicy::default(),
        }
    }
}

pub struct ScreeningOrchestrator {
    similarity: SimilarityScorer,
    matcher: RequirementMatcher,
    aggregator: ScoringAggregator,
    max_concurrent_candidates: usize,
}

impl ScreeningOrchestrator {
    /// Connects both model clients. Either failing aborts the run.
    pub fn initialize(
        provider: &dyn ClientProvider,
        settings: ScreeningSettings,
    ) -> Result<Self, AppError> {
        let clients = provider.connect()?;
        Ok(Self::with_clients(clients, settings))
    }

    pub fn with_clients(clients: ModelClients, settings: ScreeningSettings) -> Self {
        let gate = ModelGate::new(settings.max_concurrent_model_calls, settings.model_timeout);

        Self {
            similarity: SimilarityScorer::new(clients.embedder, gate.clone()),
            matcher: RequirementMatcher::new(
                clients.llm.clone(),
                gate.clone(),
                settings.policy.fallback_confidence,
            ),
            aggregator: ScoringAggregator::new(settings.policy, clients.llm, gate),
            max_concurrent_candidates: settings.max_concurrent_candidates.max(1),
        }
    }

    /// Screens every candidate against the job description and returns the
    /// results ranked by match score. Never fails once initialized.
    pub async fn screen_all(
        &self,
        jd_text: &str,
        candidates: Vec<ResumeDocument>,
    ) -> Vec<ScreeningResult> {
        let started = Instant::now();
        let total = candidates.len();
        info!("Screening {total} candidate(s)");

        let job = parse_job_description(jd_text);
        info!(
            "Job description: {} requirement(s), {} keyword(s)",
            job.requirements.len(),
            job.keywords.len()
        );
        let jd_embedding = self.similarity.embed_or_zero(jd_text).await;

        let job = &job;
        let jd_embedding = &jd_embedding;
        let mut results: Vec<ScreeningResult> = stream::iter(candidates)
            .map(|candidate| async move {
                let filename = candidate.filename.clone();
                match AssertUnwindSafe(self.screen_candidate(job, jd_embedding, candidate))
                    .catch_unwind()
                    .await
                {
                    Ok(result) => result,
                    Err(panic) => {
                        let message = panic_message(panic.as_ref());
                        error!("Screening {filename} aborted: {message}");
                        ScreeningResult::failed(filename, message)
                    }
                }
            })
            .buffered(self.max_concurrent_candidates)
            .collect()
            .await;

        rank(&mut results);

        let failed = results.iter().filter(|r| r.status.is_failed()).count();
        info!(
            "Screening finished: {total} candidate(s), {failed} failed, in {}ms",
            started.elapsed().as_millis()
        );
        results
    }

    async fn screen_candidate(
        &self,
        job: &JobDescription,
        jd_embedding: &Embedding,
        candidate: ResumeDocument,
    ) -> ScreeningResult {
        let mut prior_degradations = Vec::new();
        if is_extraction_error(&candidate.raw_text) {
            warn!("{}: {}", candidate.filename, candidate.raw_text);
            prior_degradations.push(format!("text extraction failed: {}", candidate.raw_text));
        }

        let structured = candidate
            .structured
            .unwrap_or_else(|| extract_structured_resume(&candidate.raw_text));
        let resume_text = if structured.full_text.is_empty() {
            candidate.raw_text.as_str()
        } else {
            structured.full_text.as_str()
        };

        let similarity = async {
            let resume_embedding = self.similarity.embed_or_zero(resume_text).await;
            self.similarity.compare(jd_embedding, &resume_embedding)
        };
        let (similarity, requirements_analysis) = tokio::join!(
            similarity,
            self.matcher.match_all(&job.requirements, &structured.skills)
        );

        let result = self
            .aggregator
            .aggregate(CandidateEvidence {
                filename: &candidate.filename,
                jd_text: &job.full_text,
                requirements: &job.requirements,
                resume_text,
                contact_info: structured.contact_info.clone(),
                similarity,
                requirements_analysis,
                prior_degradations,
            })
            .await;

        info!(
            "{}: match_score={:.3} similarity={:.3} requirements={:.3}",
            result.filename,
            result.match_score,
            result.overall_similarity,
            result.requirements_match_rate
        );
        result
    }
}

/// Sorts by match score, highest first. Stable: ties keep input order.
pub fn rank(results: &mut [ScreeningResult]) {
    results.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
}

/// One-shot run: connect clients, then screen.
pub async fn run_screening(
    provider: &dyn ClientProvider,
    settings: ScreeningSettings,
    jd_text: &str,
    candidates: Vec<ResumeDocument>,
) -> Result<Vec<ScreeningResult>, AppError> {
    let orchestrator = ScreeningOrchestrator::initialize(provider, settings)?;
    Ok(orchestrator.screen_all(jd_text, candidates).await)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "candidate processing panicked".to_string()
    }
}
