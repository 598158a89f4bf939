// Prompt templates for the screening pipeline.
// Placeholders are filled in a single pass, so braces inside resume or job
// text are never treated as placeholders themselves.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern is valid"));

/// Per-requirement judgment. Replace `{requirement}` and `{skills}`.
/// The reply is parsed line by line by `matcher::parse_verdict`.
pub const REQUIREMENT_MATCH_PROMPT_TEMPLATE: &str = r#"Job Requirement: {requirement}

Candidate Skills: {skills}

Does the candidate meet this requirement based on their skills?
Consider equivalent technologies and transferable experience, but do not assume skills that are not listed.

Respond in exactly this format:
Matched: Yes or No
Confidence: an integer from 0 to 100
Explanation: one or two sentences"#;

/// Candidate summary. Replace `{jd_excerpt}`, `{requirements}`,
/// `{resume_excerpt}` and `{match_score}`.
pub const SUMMARY_PROMPT_TEMPLATE: &str = r#"Job Description (excerpt):
{jd_excerpt}

Key Requirements:
{requirements}

Resume (excerpt):
{resume_excerpt}

Computed match score: {match_score}

Write a concise summary (at most 3 sentences) of how well this candidate fits the role.
Mention their strongest qualifications and the most important gaps. Plain text only."#;

/// Substitutes `{name}` placeholders from `values`. Unknown names are left as is.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| {
            values
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

pub fn requirement_match_prompt(requirement: &str, skills: &[String]) -> String {
    let skills = skills.join(", ");
    fill_template(
        REQUIREMENT_MATCH_PROMPT_TEMPLATE,
        &[("requirement", requirement), ("skills", skills.as_str())],
    )
}

pub fn summary_prompt(
    jd_excerpt: &str,
    requirements: &[String],
    resume_excerpt: &str,
    match_score: f64,
) -> String {
    let requirements = if requirements.is_empty() {
        "- (none extracted)".to_string()
    } else {
        requirements
            .iter()
            .map(|r| format!("- {r}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let match_score = format!("{match_score:.2}");

    fill_template(
        SUMMARY_PROMPT_TEMPLATE,
        &[
            ("jd_excerpt", jd_excerpt),
            ("requirements", requirements.as_str()),
            ("resume_excerpt", resume_excerpt),
            ("match_score", match_score.as_str()),
        ],
    )
}
