use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Heuristically extracted job description.
///
/// `requirements` and `responsibilities` keep source order. `keywords` is a
/// deduplicated set; iteration order is unspecified.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobDescription {
    pub full_text: String,
    pub requirements: Vec<String>,
    pub responsibilities: Vec<String>,
    /// Reserved; qualification lines currently land in `requirements`.
    pub qualifications: Vec<String>,
    pub keywords: HashSet<String>,
}
