use std::fmt;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

/// Placeholder for card fields the scraper could not find.
pub const PLACEHOLDER: &str = "N/A";
pub const UNKNOWN: &str = "Unknown";
pub const EXPERIENCE_NOT_SPECIFIED: &str = "Not specified";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Where a posting was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PostingSource {
    Scraped,
    Api,
}

/// Publication date of a posting, or `Unknown` when the source gave none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostedDate {
    On(NaiveDate),
    Unknown,
}

impl fmt::Display for PostedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostedDate::On(date) => write!(f, "{}", date.format(DATE_FORMAT)),
            PostedDate::Unknown => f.write_str("unknown"),
        }
    }
}

impl Serialize for PostedDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One job listing, normalized across sources.
///
/// `title` and `company` are never empty: construction goes through
/// [`JobPosting::new`], which refuses blank values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub date_posted: PostedDate,
    pub description: String,
    pub source: PostingSource,
    /// Source-specific identifier; debugging only.
    pub raw_id: Option<String>,
    pub experience: String,
    pub skills: Vec<String>,
}

impl JobPosting {
    /// Returns `None` when title or company is blank, so callers discard the
    /// record instead of storing empty data.
    pub fn new(title: &str, company: &str, source: PostingSource) -> Option<Self> {
        let title = title.trim();
        let company = company.trim();
        if title.is_empty() || company.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            company: company.to_string(),
            location: String::new(),
            date_posted: PostedDate::Unknown,
            description: String::new(),
            source,
            raw_id: None,
            experience: EXPERIENCE_NOT_SPECIFIED.to_string(),
            skills: vec![],
        })
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_date(mut self, date_posted: PostedDate) -> Self {
        self.date_posted = date_posted;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_raw_id(mut self, raw_id: Option<String>) -> Self {
        self.raw_id = raw_id;
        self
    }

    pub fn with_experience(mut self, experience: impl Into<String>) -> Self {
        self.experience = experience.into();
        self
    }

    pub fn with_skills(mut self, skills: Vec<String>) -> Self {
        self.skills = skills;
        self
    }
}
