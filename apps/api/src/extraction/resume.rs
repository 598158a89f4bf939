use once_cell::sync::Lazy;
use regex::Regex;

use crate::extraction::normalize_newlines;
use crate::extraction::sections::{extract_items, EDUCATION, EXPERIENCE, SKILLS};
use crate::models::resume::{ContactInfo, StructuredResume};

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("email pattern is valid")
});

static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+\d{1,3}[-.\s]?)?\(?\b\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b")
        .expect("phone pattern is valid")
});

/// Extracts contact info, skills, education and experience from resume text.
pub fn extract_structured_resume(resume_text: &str) -> StructuredResume {
    let text = normalize_newlines(resume_text);

    StructuredResume {
        contact_info: extract_contact_info(&text),
        skills: extract_items(&text, &SKILLS),
        education: extract_items(&text, &EDUCATION),
        experience: extract_items(&text, &EXPERIENCE),
        certifications: vec![],
        full_text: resume_text.to_string(),
    }
}

/// First email-shaped and first phone-shaped token anywhere in the text.
pub fn extract_contact_info(text: &str) -> ContactInfo {
    ContactInfo {
        email: EMAIL.find(text).map(|m| m.as_str().to_string()),
        phone: PHONE.find(text).map(|m| m.as_str().trim().to_string()),
    }
}
