use serde::{Deserialize, Serialize};

/// A candidate document as handed to a screening run.
///
/// `structured` is filled when the caller already extracted fields; otherwise
/// the orchestrator derives them from `raw_text`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeDocument {
    pub filename: String,
    pub raw_text: String,
    #[serde(default)]
    pub structured: Option<StructuredResume>,
}

impl ResumeDocument {
    pub fn new(filename: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            raw_text: raw_text.into(),
            structured: None,
        }
    }
}

/// First email- and phone-shaped tokens found in the resume. Either may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Heuristically extracted resume fields. Sequences are empty, never missing,
/// when a section heading cannot be located.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuredResume {
    pub contact_info: ContactInfo,
    pub skills: Vec<String>,
    pub education: Vec<String>,
    pub experience: Vec<String>,
    /// Reserved; no heuristic populates it yet.
    pub certifications: Vec<String>,
    pub full_text: String,
}
