use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extraction::normalize_newlines;
use crate::extraction::sections::{extract_items, REQUIREMENTS, RESPONSIBILITIES};
use crate::models::job::JobDescription;

/// Keyword classes scanned in a job description: technology names, degree
/// levels, and "N+ years experience" phrases. All case-insensitive.
static KEYWORD_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\bC\+\+|\b(?:Java|Python|JavaScript|React|Angular|Vue|Node\.js|SQL|NoSQL|AWS|Azure|GCP|Docker|Kubernetes|REST|API|JSON|HTML|CSS|Git)\b",
        r"(?i)\b(?:Bachelor['’]?s|Master['’]?s|PhD|degree)\b",
        r"(?i)\b\d+\+?\s+years?\s+(?:of\s+)?experience\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("keyword pattern is valid"))
    .collect()
});

/// Extracts requirements, responsibilities and keywords from a job description.
pub fn parse_job_description(jd_text: &str) -> JobDescription {
    let text = normalize_newlines(jd_text);

    JobDescription {
        full_text: jd_text.to_string(),
        requirements: extract_items(&text, &REQUIREMENTS),
        responsibilities: extract_items(&text, &RESPONSIBILITIES),
        qualifications: vec![],
        keywords: extract_keywords(&text),
    }
}

/// All keyword matches, deduplicated case-insensitively. Each keyword keeps
/// the casing of its first occurrence in the text.
pub fn extract_keywords(text: &str) -> HashSet<String> {
    let mut matches: Vec<_> = KEYWORD_PATTERNS
        .iter()
        .flat_map(|pattern| pattern.find_iter(text))
        .collect();
    matches.sort_by_key(|m| m.start());

    let mut seen = HashSet::new();
    matches
        .into_iter()
        .map(|m| m.as_str().trim().to_string())
        .filter(|keyword| seen.insert(keyword.to_lowercase()))
        .collect()
}
