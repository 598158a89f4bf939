//! Score aggregation: turns similarity plus requirement verdicts into one
//! `ScreeningResult` per candidate.
//!
//! ```text
//! requirements_match_rate = matched / max(1, total)
//! match_score             = similarity_weight   × overall_similarity
//!                         + requirements_weight × requirements_match_rate
//! ```
//!
//! Weights default to 0.5 / 0.5 and are policy, not invariants.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::llm_client::LanguageModel;
use crate::models::resume::ContactInfo;
use crate::models::screening::{
    CandidateStatus, JudgmentSource, RequirementMatchResult, ScreeningResult,
};
use crate::screening::gate::ModelGate;
use crate::screening::prompts::summary_prompt;
use crate::screening::similarity::SimilarityOutcome;

/// Tunable scoring constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub similarity_weight: f64,
    pub requirements_weight: f64,
    /// Confidence assigned to a keyword-fallback hit.
    pub fallback_confidence: f64,
    /// Characters of job description / resume text sent to the summary prompt.
    pub summary_excerpt_chars: usize,
    /// Requirements listed in the summary prompt.
    pub summary_top_requirements: usize,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            similarity_weight: 0.5,
            requirements_weight: 0.5,
            fallback_confidence: 0.7,
            summary_excerpt_chars: 500,
            summary_top_requirements: 5,
        }
    }
}

/// The three numeric fields of a `ScreeningResult`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    pub match_score: f64,
    pub overall_similarity: f64,
    pub requirements_match_rate: f64,
}

/// Zero requirements gives 0.0, not NaN.
pub fn requirements_match_rate(analysis: &[RequirementMatchResult]) -> f64 {
    let matched = analysis.iter().filter(|r| r.matched).count();
    matched as f64 / analysis.len().max(1) as f64
}

pub fn compute_scores(
    policy: &ScoringPolicy,
    overall_similarity: f64,
    analysis: &[RequirementMatchResult],
) -> Scores {
    let overall_similarity = finite_unit(overall_similarity);
    let requirements_match_rate = finite_unit(requirements_match_rate(analysis));
    let match_score = finite_unit(
        policy.similarity_weight * overall_similarity
            + policy.requirements_weight * requirements_match_rate,
    );

    Scores {
        match_score,
        overall_similarity,
        requirements_match_rate,
    }
}

fn finite_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

pub fn fallback_summary(match_score: f64) -> String {
    format!(
        "Match score: {match_score:.2}. The candidate's profile has been analyzed against the job requirements."
    )
}

/// Everything known about one candidate once similarity and matching are done.
pub struct CandidateEvidence<'a> {
    pub filename: &'a str,
    pub jd_text: &'a str,
    pub requirements: &'a [String],
    pub resume_text: &'a str,
    pub contact_info: ContactInfo,
    pub similarity: SimilarityOutcome,
    pub requirements_analysis: Vec<RequirementMatchResult>,
    /// Degradations noticed before aggregation, e.g. an extraction error.
    pub prior_degradations: Vec<String>,
}

#[derive(Clone)]
pub struct ScoringAggregator {
    policy: ScoringPolicy,
    llm: Arc<dyn LanguageModel>,
    gate: ModelGate,
}

impl ScoringAggregator {
    pub fn new(policy: ScoringPolicy, llm: Arc<dyn LanguageModel>, gate: ModelGate) -> Self {
        Self { policy, llm, gate }
    }

    pub async fn aggregate(&self, evidence: CandidateEvidence<'_>) -> ScreeningResult {
        let scores = compute_scores(
            &self.policy,
            evidence.similarity.score,
            &evidence.requirements_analysis,
        );

        let mut reasons = evidence.prior_degradations;
        if evidence.similarity.degraded {
            reasons.push("embedding unavailable; similarity defaulted to 0".to_string());
        }
        let fallbacks = evidence
            .requirements_analysis
            .iter()
            .filter(|r| r.judged_by == JudgmentSource::KeywordFallback)
            .count();
        if fallbacks > 0 {
            reasons.push(format!(
                "{fallbacks} requirement(s) judged by keyword fallback"
            ));
        }

        let top: Vec<String> = evidence
            .requirements
            .iter()
            .take(self.policy.summary_top_requirements)
            .cloned()
            .collect();
        let prompt = summary_prompt(
            &excerpt(evidence.jd_text, self.policy.summary_excerpt_chars),
            &top,
            &excerpt(evidence.resume_text, self.policy.summary_excerpt_chars),
            scores.match_score,
        );

        let summary = match self.gate.complete(self.llm.as_ref(), &prompt).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!("Empty summary for {}, using template", evidence.filename);
                reasons.push("summary generated from template".to_string());
                fallback_summary(scores.match_score)
            }
            Err(e) => {
                warn!("Summary generation failed for {}: {e}", evidence.filename);
                reasons.push("summary generated from template".to_string());
                fallback_summary(scores.match_score)
            }
        };

        ScreeningResult {
            filename: evidence.filename.to_string(),
            match_score: scores.match_score,
            overall_similarity: scores.overall_similarity,
            requirements_match_rate: scores.requirements_match_rate,
            requirements_analysis: evidence.requirements_analysis,
            summary,
            contact_info: evidence.contact_info,
            status: CandidateStatus::from_reasons(reasons),
        }
    }
}
