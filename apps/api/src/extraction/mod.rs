//! Structured extraction: turns raw resume / job-description text into typed
//! fields with pattern heuristics. Extraction never fails: a section that
//! cannot be located stays empty.

pub mod document;
pub mod job;
pub mod resume;
pub mod sections;

pub use document::{extract_text, is_extraction_error};
pub use job::parse_job_description;
pub use resume::extract_structured_resume;

/// Normalises line endings so `^`/`$` heuristics see `\n` only.
pub(crate) fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}
