//! Matching: ranks postings against a candidate profile.
//!
//! Default: `KeywordMatcher` (pure-Rust, deterministic, no model call).
//! The orchestrator holds an `Arc<dyn Matcher>`.

use std::collections::HashSet;

use tracing::debug;

use crate::models::{CandidateProfile, JobPosting, MatchResult};

/// Words in a desired position that say nothing about the job itself.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "at", "for", "general", "in", "job", "jobs", "of", "on", "or", "position",
    "role", "the", "to", "with",
];

pub trait Matcher: Send + Sync {
    /// Scores every posting and returns them best first. Equal scores keep
    /// their input order.
    fn rank(&self, profile: &CandidateProfile, postings: Vec<JobPosting>) -> Vec<MatchResult>;
}

/// Token-overlap matcher.
///
/// Terms are the candidate's skills (a multi-word skill matches only when all
/// of its tokens occur) plus the meaningful words of the desired position.
/// Score = matched terms / total terms, so it is bounded in [0, 1] and grows
/// with every additional matched term.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordMatcher;

impl Matcher for KeywordMatcher {
    fn rank(&self, profile: &CandidateProfile, postings: Vec<JobPosting>) -> Vec<MatchResult> {
        let terms = profile_terms(profile);
        debug!("Matching {} postings against {} terms", postings.len(), terms.len());

        let mut results: Vec<MatchResult> = postings
            .into_iter()
            .map(|posting| score_posting(&terms, posting))
            .collect();

        // sort_by is stable: ties keep discovery order.
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Term {
    label: String,
    tokens: Vec<String>,
}

/// Lower-cases and splits on anything that is not alphanumeric or one of
/// `+ # .`, so "C++", "C#" and "Node.js" stay whole. Trailing dots go.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.')))
        .map(|token| token.trim_end_matches('.'))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn profile_terms(profile: &CandidateProfile) -> Vec<Term> {
    let skills = profile.skills.iter().map(|skill| Term {
        label: skill.trim().to_string(),
        tokens: tokenize(skill),
    });

    let position_words = tokenize(&profile.desired_position)
        .into_iter()
        .filter(|token| !STOP_WORDS.contains(&token.as_str()))
        .map(|token| Term {
            label: token.clone(),
            tokens: vec![token],
        });

    let mut seen = HashSet::new();
    skills
        .chain(position_words)
        .filter(|term| !term.tokens.is_empty())
        .filter(|term| seen.insert(term.tokens.join(" ")))
        .collect()
}

fn score_posting(terms: &[Term], posting: JobPosting) -> MatchResult {
    let haystack: HashSet<String> = tokenize(&posting.title)
        .into_iter()
        .chain(tokenize(&posting.description))
        .chain(posting.skills.iter().flat_map(|s| tokenize(s)))
        .collect();

    let (matched, unmatched): (Vec<&Term>, Vec<&Term>) = terms
        .iter()
        .partition(|term| term.tokens.iter().all(|t| haystack.contains(t)));

    let score = if terms.is_empty() {
        0.0
    } else {
        matched.len() as f64 / terms.len() as f64
    };

    MatchResult {
        posting,
        score,
        matched_terms: matched.into_iter().map(|t| t.label.clone()).collect(),
        unmatched_terms: unmatched.into_iter().map(|t| t.label.clone()).collect(),
    }
}
