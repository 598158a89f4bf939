use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::resume::ContactInfo;

/// Which path produced a requirement verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JudgmentSource {
    /// The language model answered and its reply was parsed.
    Model,
    /// The model call failed or timed out; substring matching was used instead.
    KeywordFallback,
    /// The candidate listed no skills, so no judgment was attempted.
    NoSkills,
}

/// Verdict for one job requirement against one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementMatchResult {
    pub requirement: String,
    pub matched: bool,
    /// 0.0 – 1.0
    pub confidence: f64,
    pub explanation: String,
    pub judged_by: JudgmentSource,
}

/// Per-candidate processing outcome. Degraded results are still ranked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CandidateStatus {
    Success,
    Degraded { reasons: Vec<String> },
    Failed { error: String },
}

impl CandidateStatus {
    pub fn from_reasons(reasons: Vec<String>) -> Self {
        if reasons.is_empty() {
            CandidateStatus::Success
        } else {
            CandidateStatus::Degraded { reasons }
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CandidateStatus::Failed { .. })
    }
}

/// Final screening record for one candidate. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub filename: String,
    /// similarity_weight × overall_similarity + requirements_weight × requirements_match_rate
    pub match_score: f64,
    pub overall_similarity: f64,
    pub requirements_match_rate: f64,
    pub requirements_analysis: Vec<RequirementMatchResult>,
    pub summary: String,
    pub contact_info: ContactInfo,
    pub status: CandidateStatus,
}

impl ScreeningResult {
    /// Placeholder result for a candidate whose processing aborted.
    pub fn failed(filename: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            filename: filename.into(),
            match_score: 0.0,
            overall_similarity: 0.0,
            requirements_match_rate: 0.0,
            requirements_analysis: vec![],
            summary: format!("Screening failed for this candidate: {error}"),
            contact_info: ContactInfo::default(),
            status: CandidateStatus::Failed { error },
        }
    }
}

/// Ranked output of one screening run, as returned over HTTP.
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub candidate_count: usize,
    pub results: Vec<ScreeningResult>,
}
