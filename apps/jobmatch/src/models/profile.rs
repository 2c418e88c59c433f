use serde::{Deserialize, Serialize};

pub const DEFAULT_NAME: &str = "Unknown";
pub const DEFAULT_DESIRED_POSITION: &str = "general job";
pub const DEFAULT_PREFERRED_LOCATION: &str = "remote";

/// Structured view of a résumé.
///
/// Every field is always populated: values the model did not return are
/// filled with defaults at extraction time, so consumers never deal with
/// missing keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: String,
    pub email: Option<String>,
    pub desired_position: String,
    pub preferred_location: String,
    pub skills: Vec<String>,
    pub years_of_experience: Option<f64>,
    pub education: Vec<String>,
    pub key_achievements: Vec<String>,
    pub professional_summary: String,
    pub work_history: Vec<String>,
}

impl Default for CandidateProfile {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            email: None,
            desired_position: DEFAULT_DESIRED_POSITION.to_string(),
            preferred_location: DEFAULT_PREFERRED_LOCATION.to_string(),
            skills: vec![],
            years_of_experience: None,
            education: vec![],
            key_achievements: vec![],
            professional_summary: String::new(),
            work_history: vec![],
        }
    }
}

impl CandidateProfile {
    /// Search query used for job discovery.
    pub fn search_query(&self) -> &str {
        &self.desired_position
    }

    /// Search location used for job discovery.
    pub fn search_location(&self) -> &str {
        &self.preferred_location
    }
}

/// Loose email check: anything containing an `@`.
pub fn is_plausible_email(value: &str) -> bool {
    value.contains('@')
}
