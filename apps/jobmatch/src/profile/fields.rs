//! Maps a parsed model reply onto `CandidateProfile`.
//!
//! Models are inconsistent about key spelling ("Desired Position",
//! "desired-position", "desired_position") and value shape (list vs.
//! comma-separated string). Keys are normalized first, then each field is
//! read leniently. Anything missing or unusable falls back to the default.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};
use tracing::debug;

use crate::models::profile::{
    is_plausible_email, CandidateProfile, DEFAULT_DESIRED_POSITION, DEFAULT_NAME,
    DEFAULT_PREFERRED_LOCATION,
};

const NAME_KEYS: &[&str] = &["name", "full_name", "candidate_name"];
const EMAIL_KEYS: &[&str] = &["email", "email_address"];
const POSITION_KEYS: &[&str] = &["desired_position", "position", "job_title"];
const LOCATION_KEYS: &[&str] = &["preferred_location", "location"];
const SKILLS_KEYS: &[&str] = &["skills", "technical_skills", "key_skills"];
const YEARS_KEYS: &[&str] = &["years_of_experience", "experience_years", "total_experience"];
const EDUCATION_KEYS: &[&str] = &["education", "education_background"];
const ACHIEVEMENT_KEYS: &[&str] = &["key_achievements", "achievements"];
const SUMMARY_KEYS: &[&str] = &["professional_summary", "summary"];
const WORK_KEYS: &[&str] = &["work_history", "work_experience"];

/// Lower-case, with spaces and hyphens folded into underscores.
pub fn normalize_key(key: &str) -> String {
    key.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

pub fn profile_from_object(object: &Map<String, Value>) -> CandidateProfile {
    let fields: HashMap<String, &Value> = object
        .iter()
        .map(|(k, v)| (normalize_key(k), v))
        .collect();

    let email = string_field(&fields, EMAIL_KEYS).filter(|e| {
        let ok = is_plausible_email(e);
        if !ok {
            debug!("Dropping implausible email from model reply: {e}");
        }
        ok
    });

    CandidateProfile {
        name: string_field(&fields, NAME_KEYS).unwrap_or_else(|| DEFAULT_NAME.to_string()),
        email,
        desired_position: string_field(&fields, POSITION_KEYS)
            .unwrap_or_else(|| DEFAULT_DESIRED_POSITION.to_string()),
        preferred_location: string_field(&fields, LOCATION_KEYS)
            .unwrap_or_else(|| DEFAULT_PREFERRED_LOCATION.to_string()),
        skills: dedup_case_insensitive(list_field(&fields, SKILLS_KEYS, true)),
        years_of_experience: years_field(&fields, YEARS_KEYS),
        education: list_field(&fields, EDUCATION_KEYS, false),
        key_achievements: list_field(&fields, ACHIEVEMENT_KEYS, false),
        professional_summary: string_field(&fields, SUMMARY_KEYS).unwrap_or_default(),
        work_history: list_field(&fields, WORK_KEYS, false),
    }
}

fn lookup<'a>(fields: &HashMap<String, &'a Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| fields.get(*k).copied())
        .find(|v| !v.is_null())
}

fn string_field(fields: &HashMap<String, &Value>, keys: &[&str]) -> Option<String> {
    let text = match lookup(fields, keys)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Reads a list; a plain string becomes one entry, or is split on `,`/`;`/newlines
/// when `split_strings` is set.
fn list_field(fields: &HashMap<String, &Value>, keys: &[&str], split_strings: bool) -> Vec<String> {
    let Some(value) = lookup(fields, keys) else {
        return vec![];
    };
    let items: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(entry_text).collect(),
        Value::String(s) if split_strings => s
            .split(&[',', ';', '\n'][..])
            .map(|part| part.trim().to_string())
            .collect(),
        other => entry_text(other).into_iter().collect(),
    };
    items.into_iter().filter(|s| !s.is_empty()).collect()
}

/// Free-text rendering of one list entry. Objects are flattened to their
/// scalar values joined with ", ".
fn entry_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => {
            let parts: Vec<String> = map
                .values()
                .filter_map(|v| match v {
                    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Array(_) | Value::Null => None,
    }
}

fn years_field(fields: &HashMap<String, &Value>, keys: &[&str]) -> Option<f64> {
    let years = match lookup(fields, keys)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => leading_number(s)?,
        _ => return None,
    };
    (years.is_finite() && years >= 0.0).then_some(years)
}

/// "5+ years" → 5.0, "3.5" → 3.5, "about 4" → None.
fn leading_number(text: &str) -> Option<f64> {
    let digits: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.trim_end_matches('.').parse::<f64>().ok()
}

fn dedup_case_insensitive(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.to_lowercase()))
        .collect()
}
