use std::sync::Arc;

use futures::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::llm_client::LanguageModel;
use crate::models::screening::{JudgmentSource, RequirementMatchResult};
use crate::screening::gate::ModelGate;
use crate::screening::prompts::requirement_match_prompt;

pub const NO_SKILLS_EXPLANATION: &str = "No skills listed in resume.";
pub const UNPARSED_EXPLANATION: &str = "Could not determine match.";
pub const FALLBACK_EXPLANATION: &str =
    "Based on direct keyword matching; the language model was unavailable.";

// Values may be wrapped in markdown emphasis or [brackets].
static MATCHED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bmatched\s*:[*\[\s]*(yes|no)\b").expect("matched pattern is valid")
});
static CONFIDENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bconfidence\s*:[*\[\s]*(\d+(?:\.\d+)?)\s*(%)?")
        .expect("confidence pattern is valid")
});
static EXPLANATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\bexplanation\s*:\s*(.*)").expect("explanation pattern is valid")
});

/// Judges one requirement against a candidate's skills.
///
/// The language model is asked first; any failure or timeout falls back to
/// case-insensitive substring matching. `judged_by` on the result records
/// which path produced the verdict.
#[derive(Clone)]
pub struct RequirementMatcher {
    llm: Arc<dyn LanguageModel>,
    gate: ModelGate,
    fallback_confidence: f64,
}

impl RequirementMatcher {
    pub fn new(llm: Arc<dyn LanguageModel>, gate: ModelGate, fallback_confidence: f64) -> Self {
        Self {
            llm,
            gate,
            fallback_confidence,
        }
    }

    pub async fn match_requirement(
        &self,
        requirement: &str,
        skills: &[String],
    ) -> RequirementMatchResult {
        if skills.is_empty() {
            return RequirementMatchResult {
                requirement: requirement.to_string(),
                matched: false,
                confidence: 0.0,
                explanation: NO_SKILLS_EXPLANATION.to_string(),
                judged_by: JudgmentSource::NoSkills,
            };
        }

        let prompt = requirement_match_prompt(requirement, skills);
        match self.gate.complete(self.llm.as_ref(), &prompt).await {
            Ok(reply) => {
                debug!("Requirement '{requirement}' judged by model");
                parse_verdict(requirement, &reply)
            }
            Err(e) => {
                warn!("Requirement match for '{requirement}' fell back to keywords: {e}");
                keyword_fallback(requirement, skills, self.fallback_confidence)
            }
        }
    }

    /// Results come back in requirement order.
    pub async fn match_all(
        &self,
        requirements: &[String],
        skills: &[String],
    ) -> Vec<RequirementMatchResult> {
        join_all(
            requirements
                .iter()
                .map(|requirement| self.match_requirement(requirement, skills)),
        )
        .await
    }
}

/// Reads the three-line `Matched / Confidence / Explanation` reply.
/// Missing fields keep their defaults: not matched, 0.0, placeholder text.
pub fn parse_verdict(requirement: &str, reply: &str) -> RequirementMatchResult {
    let matched = MATCHED_RE
        .captures(reply)
        .map(|c| c[1].eq_ignore_ascii_case("yes"))
        .unwrap_or(false);

    let confidence = CONFIDENCE_RE
        .captures(reply)
        .and_then(|c| {
            let value = c[1].parse::<f64>().ok()?;
            Some(confidence_from_reply(value, c[1].contains('.'), c.get(2).is_some()))
        })
        .unwrap_or(0.0);

    let explanation = EXPLANATION_RE
        .captures(reply)
        .map(|c| c[1].trim().to_string())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| UNPARSED_EXPLANATION.to_string());

    RequirementMatchResult {
        requirement: requirement.to_string(),
        matched,
        confidence,
        explanation,
        judged_by: JudgmentSource::Model,
    }
}

/// Confidence is asked for as a percentage, but a decimal in [0, 1] without a
/// `%` sign is read as a fraction.
fn confidence_from_reply(value: f64, has_decimal_point: bool, has_percent_sign: bool) -> f64 {
    let fraction = if has_decimal_point && !has_percent_sign && value <= 1.0 {
        value
    } else {
        value / 100.0
    };
    fraction.clamp(0.0, 1.0)
}

/// Deterministic verdict: does any skill contain the requirement text?
pub fn keyword_fallback(
    requirement: &str,
    skills: &[String],
    fallback_confidence: f64,
) -> RequirementMatchResult {
    let needle = requirement.trim().to_lowercase();
    let matched = !needle.is_empty()
        && skills
            .iter()
            .any(|skill| skill.to_lowercase().contains(&needle));

    RequirementMatchResult {
        requirement: requirement.to_string(),
        matched,
        confidence: if matched { fallback_confidence } else { 0.0 },
        explanation: FALLBACK_EXPLANATION.to_string(),
        judged_by: JudgmentSource::KeywordFallback,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::StubLlm;

    fn skills(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn matcher(llm: Arc<StubLlm>) -> RequirementMatcher {
        RequirementMatcher::new(llm, ModelGate::new(4, Duration::from_secs(5)), 0.7)
    }

    #[tokio::test]
    async fn test_empty_skills_short_circuits_without_model_call() {
        let llm = Arc::new(StubLlm::replying("Matched: Yes\nConfidence: 99\nExplanation: x"));
        let result = matcher(llm.clone()).match_requirement("Python", &[]).await;

        assert!(!result.matched);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.explanation, NO_SKILLS_EXPLANATION);
        assert_eq!(result.judged_by, JudgmentSource::NoSkills);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_model_failure_falls_back_to_keyword_match() {
        let llm = Arc::new(StubLlm::failing());
        let result = matcher(llm.clone())
            .match_requirement("Python", &skills(&["Python", "SQL"]))
            .await;

        assert!(result.matched);
        assert!((result.confidence - 0.7).abs() < 1e-9);
        assert!(result.explanation.contains("keyword matching"));
        assert_eq!(result.judged_by, JudgmentSource::KeywordFallback);
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fallback_miss_has_zero_confidence() {
        let result = matcher(Arc::new(StubLlm::failing()))
            .match_requirement("Kubernetes", &skills(&["Python", "SQL"]))
            .await;
        assert!(!result.matched);
        assert_eq!(result.confidence, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_model_timeout_falls_back() {
        let result = matcher(Arc::new(StubLlm::hanging()))
            .match_requirement("sql", &skills(&["PostgreSQL"]))
            .await;
        assert!(result.matched);
        assert_eq!(result.judged_by, JudgmentSource::KeywordFallback);
    }

    #[tokio::test]
    async fn test_model_verdict_is_parsed() {
        let llm = Arc::new(StubLlm::replying(
            "Matched: Yes\nConfidence: 85\nExplanation: Lists Django and Flask.",
        ));
        let result = matcher(llm)
            .match_requirement("Python web frameworks", &skills(&["Django", "Flask"]))
            .await;

        assert!(result.matched);
        assert!((result.confidence - 0.85).abs() < 1e-9);
        assert_eq!(result.explanation, "Lists Django and Flask.");
        assert_eq!(result.judged_by, JudgmentSource::Model);
    }

    #[tokio::test]
    async fn test_match_all_preserves_requirement_order() {
        let llm = Arc::new(StubLlm::with(|prompt| {
            let verdict = if prompt.contains("Job Requirement: Rust") { "Yes" } else { "No" };
            crate::testing::StubReply::Text(format!("Matched: {verdict}\nConfidence: 60"))
        }));
        let requirements = skills(&["Go", "Rust", "Haskell"]);
        let results = matcher(llm.clone())
            .match_all(&requirements, &skills(&["Rust"]))
            .await;

        let names: Vec<_> = results.iter().map(|r| r.requirement.as_str()).collect();
        assert_eq!(names, vec!["Go", "Rust", "Haskell"]);
        assert_eq!(
            results.iter().map(|r| r.matched).collect::<Vec<_>>(),
            vec![false, true, false]
        );
        assert_eq!(llm.call_count(), 3);
    }

    #[test]
    fn test_parse_verdict_tolerates_case_and_markdown() {
        let result = parse_verdict("r", "**matched:** NO\n**Confidence:** 40%\nexplanation:  weak  ");
        assert!(!result.matched);
        assert!((result.confidence - 0.4).abs() < 1e-9);
        assert_eq!(result.explanation, "weak");
    }

    #[test]
    fn test_parse_verdict_defaults_when_unparseable() {
        let result = parse_verdict("r", "I think so, probably.");
        assert!(!result.matched);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.explanation, UNPARSED_EXPLANATION);
        assert_eq!(result.judged_by, JudgmentSource::Model);
    }

    #[test]
    fn test_parse_verdict_clamps_confidence() {
        let result = parse_verdict("r", "Matched: Yes\nConfidence: 250");
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_parse_verdict_ignores_words_ending_in_matched() {
        let result = parse_verdict("r", "Unmatched: yes\nConfidence: 70");
        assert!(!result.matched);

        let result = parse_verdict("r", "Unmatched: yes\nMatched: Yes");
        assert!(result.matched);
    }

    #[test]
    fn test_parse_verdict_accepts_bracketed_values() {
        let result = parse_verdict("r", "Matched: [Yes]\nConfidence: [80]\nExplanation: [Has it]");
        assert!(result.matched);
        assert!((result.confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_parse_verdict_reads_decimal_confidence_as_fraction() {
        let result = parse_verdict("r", "Matched: Yes\nConfidence: 0.9");
        assert!((result.confidence - 0.9).abs() < 1e-9);

        let result = parse_verdict("r", "Matched: Yes\nConfidence: 0.5%");
        assert!((result.confidence - 0.005).abs() < 1e-9);

        let result = parse_verdict("r", "Matched: Yes\nConfidence: 87.5");
        assert!((result.confidence - 0.875).abs() < 1e-9);

        let result = parse_verdict("r", "Matched: Yes\nConfidence: 1");
        assert!((result.confidence - 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_is_case_insensitive_substring() {
        let result = keyword_fallback("python", &skills(&["Python 3", "SQL"]), 0.7);
        assert!(result.matched);

        let result = keyword_fallback("3+ years experience", &skills(&["Python", "Java"]), 0.7);
        assert!(!result.matched);
    }
}
