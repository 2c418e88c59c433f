use serde::Serialize;

use crate::models::job::JobPosting;

/// Score of one posting against a candidate profile. Derived per run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub posting: JobPosting,
    /// 0.0..=1.0
    pub score: f64,
    pub matched_terms: Vec<String>,
    pub unmatched_terms: Vec<String>,
}
